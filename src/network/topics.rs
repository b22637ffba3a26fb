//! Topic Name Protocol
//!
//! Builds the channel and destination names shared with the remote peer.
//! Names are wire-compatible and must not change shape.

use crate::game::store::UpdateKind;

/// Destination for creating a new session.
pub const DEST_START: &str = "game.start";
/// Destination for joining a session (random, or by id when given).
pub const DEST_CONNECT: &str = "game.connect";
/// Destination for playing a move.
pub const DEST_GAMEPLAY: &str = "game.gameplay";
/// Destination for requesting a surrender.
pub const DEST_SURRENDER: &str = "game.surrender";
/// Destination for answering a surrender request.
pub const DEST_SURRENDER_RESPONSE: &str = "game.surrender.response";
/// Destination for answering a join request.
pub const DEST_JOIN_RESPONSE: &str = "game.join.response";
/// Destination for requesting a rematch.
pub const DEST_REMATCH: &str = "game.rematch";
/// Destination for answering a rematch request.
pub const DEST_REMATCH_RESPONSE: &str = "game.rematch.response";

/// Personal notification categories, paired with their topic prefix.
const PERSONAL_PREFIXES: [(&str, UpdateKind); 7] = [
    ("game.connected.", UpdateKind::Connected),
    ("game.created.", UpdateKind::Created),
    ("game.join.request.", UpdateKind::JoinRequest),
    ("game.join.pending.", UpdateKind::JoinPending),
    ("game.join.rejected.", UpdateKind::JoinRejected),
    ("game.updated.", UpdateKind::Updated),
    ("game.rematch.accepted.", UpdateKind::RematchAccepted),
];

/// All personal topics for one identity, in subscription order.
pub fn personal_topics(identity: &str) -> Vec<String> {
    PERSONAL_PREFIXES
        .iter()
        .map(|(prefix, _)| format!("{prefix}{identity}"))
        .collect()
}

/// The session-scoped topic for one session identifier.
pub fn session_topic(session_id: &str) -> String {
    format!("game.{session_id}")
}

/// Classify an inbound topic for the given identity.
///
/// Personal topics match by exact name; anything else under the `game.`
/// namespace is a session-scoped update. Unknown topics yield `None` and
/// are dropped by the caller.
pub fn classify(topic: &str, identity: &str) -> Option<UpdateKind> {
    for (prefix, kind) in PERSONAL_PREFIXES {
        if let Some(suffix) = topic.strip_prefix(prefix) {
            if suffix == identity {
                return Some(kind);
            }
        }
    }
    if topic.strip_prefix("game.").is_some_and(|s| !s.is_empty()) {
        return Some(UpdateKind::Session);
    }
    None
}
