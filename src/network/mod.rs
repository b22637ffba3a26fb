//! Network Layer
//!
//! Pub/sub plumbing between this client and the remote authority: topic
//! name protocol, command wire format, and the WebSocket transport.

pub mod protocol;
pub mod topics;
pub mod transport;
pub mod websocket;

pub use protocol::{
    ConnectCommand, JoinResponseCommand, MoveCommand, RematchCommand,
    RematchResponseCommand, StartCommand, SurrenderCommand, SurrenderResponseCommand,
};
pub use transport::{InboundMessage, Transport, TransportError};
pub use websocket::{WebSocketConfig, WebSocketTransport};
