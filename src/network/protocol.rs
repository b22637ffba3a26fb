//! Command Payloads
//!
//! Wire format for client commands sent to the remote authority.
//! All payloads are JSON with camelCase fields; shapes are fixed by the
//! peer and must not drift.

use serde::{Serialize, Deserialize};

use crate::game::snapshot::PlayerRef;

/// `game.start` — create a new session owned by this identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCommand {
    /// Acting identity.
    pub identity: String,
}

/// `game.connect` — join a session. Without `session_id` the peer picks
/// (or creates) a random open session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectCommand {
    /// Joining player.
    pub player: PlayerRef,
    /// Target session, omitted for join-random.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// `game.gameplay` — place a mark on a square.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCommand {
    /// Acting identity.
    pub identity: String,
    /// Target cell, 0..=8 in row-major order.
    pub square_index: usize,
    /// Session the move belongs to.
    pub session_id: String,
}

/// `game.surrender` — propose to give up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurrenderCommand {
    /// Acting identity.
    pub identity: String,
    /// Session the proposal belongs to.
    pub session_id: String,
}

/// `game.surrender.response` — answer a surrender proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurrenderResponseCommand {
    /// Acting identity.
    pub identity: String,
    /// Session the proposal belongs to.
    pub session_id: String,
    /// Whether the surrender is accepted.
    pub accepted: bool,
}

/// `game.join.response` — the session owner answers a join request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponseCommand {
    /// Session owner answering the request.
    pub responder_identity: String,
    /// Identity that asked to join.
    pub requester_identity: String,
    /// Session being joined.
    pub session_id: String,
    /// Whether the join is approved.
    pub accepted: bool,
}

/// `game.rematch` — propose a rematch after a finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RematchCommand {
    /// Acting identity.
    pub identity: String,
    /// Finished session the proposal refers to.
    pub session_id: String,
}

/// `game.rematch.response` — answer a rematch proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RematchResponseCommand {
    /// Acting identity.
    pub identity: String,
    /// Finished session the proposal refers to.
    pub session_id: String,
    /// Whether the rematch is accepted.
    pub accepted: bool,
}
