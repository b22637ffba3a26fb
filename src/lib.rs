//! # Tic-Tac-Toe Sync Client
//!
//! Real-time session-synchronization layer for a two-player turn-based
//! game. The client mirrors the last known session snapshot from an
//! authoritative remote peer over a publish/subscribe transport; it never
//! decides game legality itself.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  TIC-TAC-TOE SYNC CLIENT                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/           - Local session mirror                      │
//! │  ├── snapshot.rs - Session snapshot wire model               │
//! │  └── store.rs    - Single mutable slot, last-write-wins      │
//! │                                                              │
//! │  network/        - Pub/sub plumbing                          │
//! │  ├── topics.rs   - Channel / destination name protocol       │
//! │  ├── protocol.rs - Outgoing command payloads                 │
//! │  ├── transport.rs- Transport trait                           │
//! │  └── websocket.rs- WebSocket broker transport                │
//! │                                                              │
//! │  client/         - Coordination                              │
//! │  ├── registry.rs - Per-identity subscription set             │
//! │  └── game.rs     - GameClient: intents in, snapshots out     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Synchronization model
//!
//! All state is transient: it is rebuilt entirely from the first relevant
//! inbound message after each connection. Inbound updates always replace
//! the snapshot wholesale; the most recently delivered message wins,
//! whichever channel carried it. Negotiations (join, surrender, rematch)
//! are pairs of independent fire-and-forget messages correlated only by
//! session id and identity.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use client::{GameClient, SubscriptionRegistry};
pub use game::{GameSnapshot, GameStatus, Mark, Notice, PlayerRef, SessionStore};
pub use network::{Transport, TransportError, WebSocketConfig, WebSocketTransport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
