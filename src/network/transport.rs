//! Transport Abstraction
//!
//! One logical connection to the remote peer, exposing pub/sub
//! primitives. The client owns its transport instance explicitly; there
//! is no shared global connection.

use serde_json::Value;

/// A message delivered on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic the message arrived on.
    pub topic: String,
    /// Raw JSON payload.
    pub body: Value,
}

/// Transport-level errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection could not be established within the attempt budget.
    #[error("Failed to connect after {attempts} attempts: {reason}")]
    ConnectFailed {
        /// Attempts made before giving up.
        attempts: u32,
        /// Last underlying failure.
        reason: String,
    },

    /// Operation requires an established connection.
    #[error("Not connected")]
    NotConnected,

    /// The peer closed the connection.
    #[error("Connection closed by peer")]
    Closed,

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed frame received from the broker.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Broker-reported error frame.
    #[error("Broker error: {0}")]
    Broker(String),
}

/// A single logical pub/sub connection to the remote peer.
///
/// `connect` must complete before any other operation; `subscribe` and
/// `publish` return [`TransportError::NotConnected`] otherwise. Delivery
/// per topic is at-least-once and in order; there is no ordering
/// guarantee across topics. `publish` is fire-and-forget: a send error
/// reports the local failure only, never delivery status.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Establish the connection, completing once the peer confirms
    /// readiness. Retries are bounded; exhaustion yields
    /// [`TransportError::ConnectFailed`].
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Release all subscriptions and the underlying connection.
    /// Idempotent.
    async fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Register interest in a topic.
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Send a command to a destination.
    async fn publish(&mut self, destination: &str, body: Value) -> Result<(), TransportError>;

    /// Receive the next inbound message. `Ok(None)` means the connection
    /// is closed and no further messages will arrive.
    async fn recv(&mut self) -> Result<Option<InboundMessage>, TransportError>;

    /// Whether the connection is currently established.
    fn is_connected(&self) -> bool;
}
