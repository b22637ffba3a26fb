//! Session Snapshot Model
//!
//! The client's view of one game session as asserted by the remote
//! authority. Snapshots are immutable values: every inbound update
//! replaces the whole snapshot, fields are never patched in place.

use serde::{Serialize, Deserialize};

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// A mark placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    /// Cross, first player's mark.
    X,
    /// Nought, second player's mark.
    O,
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Created, waiting for a second player.
    New,
    /// Both seats filled, moves being played.
    InProgress,
    /// Decided by win, draw or accepted surrender.
    Finished,
}

/// A player seat reference carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Display identity of the player.
    pub identity: String,
}

impl PlayerRef {
    /// Create a seat reference for the given identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self { identity: identity.into() }
    }
}

/// The last known state of one session, assigned by the remote peer.
///
/// `sessionId` is stable for the session's lifetime. Negotiation fields
/// (`surrenderRequester`, `pendingJoiner`, `rematchRequester`) are each
/// keyed independently; session status gates which of them is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Opaque session identifier.
    pub session_id: String,
    /// Board cells in row-major order, `None` = empty.
    pub board: [Option<Mark>; BOARD_CELLS],
    /// Lifecycle status.
    pub status: GameStatus,
    /// Identity permitted to move next; meaningful only while in progress.
    #[serde(default)]
    pub current_turn_identity: Option<String>,
    /// First seat (session owner).
    pub player1: PlayerRef,
    /// Second seat, absent until a join succeeds.
    #[serde(default)]
    pub player2: Option<PlayerRef>,
    /// Winning mark, absent on draw or while unfinished.
    #[serde(default)]
    pub winner_mark: Option<Mark>,
    /// Identity that most recently requested to surrender.
    #[serde(default)]
    pub surrender_requester: Option<String>,
    /// Identity awaiting the owner's approval to join.
    #[serde(default)]
    pub pending_joiner: Option<String>,
    /// Identity that most recently requested a rematch.
    #[serde(default)]
    pub rematch_requester: Option<String>,
}

impl GameSnapshot {
    /// Whether the given identity occupies one of the two seats.
    pub fn is_seated(&self, identity: &str) -> bool {
        self.player1.identity == identity
            || self.player2.as_ref().is_some_and(|p| p.identity == identity)
    }

    /// Whether it is the given identity's turn to move.
    pub fn is_turn_of(&self, identity: &str) -> bool {
        self.status == GameStatus::InProgress
            && self.current_turn_identity.as_deref() == Some(identity)
    }
}
