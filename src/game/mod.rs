//! Game State Layer
//!
//! Local mirror of the authoritative session. The remote peer decides
//! legality and outcomes; this layer only stores what it is told.

pub mod snapshot;
pub mod store;

pub use snapshot::{GameSnapshot, GameStatus, Mark, PlayerRef, BOARD_CELLS};
pub use store::{Notice, SessionStore, UpdateKind};
