//! WebSocket Transport
//!
//! Pub/sub client over a WebSocket broker. Frames are JSON for debugging
//! ease. The broker confirms readiness with a `connected` frame after the
//! socket handshake; nothing may be published before it arrives.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::network::transport::{InboundMessage, Transport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Broker frames, both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// Client -> broker: register interest in a topic.
    Subscribe {
        /// Topic name.
        topic: String,
    },
    /// Client -> broker: deliver a command to a destination.
    Send {
        /// Destination name.
        destination: String,
        /// Command payload.
        body: Value,
    },
    /// Broker -> client: handshake complete, publishing is now safe.
    Connected,
    /// Broker -> client: a message on a subscribed topic.
    Message {
        /// Topic the message arrived on.
        topic: String,
        /// Message payload.
        body: Value,
    },
    /// Broker -> client: protocol-level error report.
    Error {
        /// Human-readable description.
        message: String,
    },
}

/// WebSocket transport configuration.
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Broker URL.
    pub url: String,
    /// Connection attempts before surfacing a terminal error.
    pub max_connect_attempts: u32,
    /// Delay between connection attempts.
    pub retry_delay: Duration,
    /// Capacity of the inbound message queue.
    pub inbound_capacity: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080/ws".to_string(),
            max_connect_attempts: 5,
            retry_delay: Duration::from_secs(5),
            inbound_capacity: 256,
        }
    }
}

/// A WebSocket-backed [`Transport`].
///
/// Owned explicitly by its client; dropping or disconnecting it releases
/// the socket and every subscription. A peer-side close surfaces as `None`
/// from [`Transport::recv`], which also drops the dead connection state so
/// a fresh [`Transport::connect`] can re-establish the link.
pub struct WebSocketTransport {
    config: WebSocketConfig,
    writer: Option<SplitSink<WsStream, Message>>,
    inbound: Option<mpsc::Receiver<InboundMessage>>,
    reader: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    /// Create a disconnected transport with the given configuration.
    pub fn new(config: WebSocketConfig) -> Self {
        Self {
            config,
            writer: None,
            inbound: None,
            reader: None,
        }
    }

    async fn send_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let writer = self.writer.as_mut().ok_or(TransportError::NotConnected)?;
        let json = serde_json::to_string(frame)
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        writer.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Wait for the broker's readiness frame after the socket handshake.
    async fn await_ready(read: &mut SplitStream<WsStream>) -> Result<(), TransportError> {
        while let Some(result) = read.next().await {
            match result? {
                Message::Text(text) => match serde_json::from_str::<Frame>(&text) {
                    Ok(Frame::Connected) => return Ok(()),
                    Ok(Frame::Error { message }) => {
                        return Err(TransportError::Broker(message));
                    }
                    Ok(other) => {
                        debug!(?other, "frame before readiness, ignored");
                    }
                    Err(e) => {
                        return Err(TransportError::Protocol(e.to_string()));
                    }
                },
                Message::Close(_) => return Err(TransportError::Closed),
                _ => {}
            }
        }
        Err(TransportError::Closed)
    }
}

/// Forward inbound message frames until the socket or the consumer goes
/// away. Broker error frames are logged, never fatal.
async fn read_loop(mut read: SplitStream<WsStream>, tx: mpsc::Sender<InboundMessage>) {
    while let Some(result) = read.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<Frame>(&text) {
                Ok(Frame::Message { topic, body }) => {
                    if tx.send(InboundMessage { topic, body }).await.is_err() {
                        break;
                    }
                }
                Ok(Frame::Error { message }) => {
                    error!(%message, "broker reported error");
                }
                Ok(other) => {
                    debug!(?other, "unexpected frame direction, ignored");
                }
                Err(e) => {
                    warn!(error = %e, "malformed frame, dropped");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // ping/pong/binary
            Err(e) => {
                error!(error = %e, "WebSocket read error");
                break;
            }
        }
    }
    debug!("reader loop ended");
}

impl Transport for WebSocketTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.is_connected() {
            return Ok(());
        }

        let attempts = self.config.max_connect_attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            match connect_async(self.config.url.as_str()).await {
                Ok((stream, _)) => {
                    let (writer, mut read) = stream.split();
                    match Self::await_ready(&mut read).await {
                        Ok(()) => {
                            let (tx, rx) = mpsc::channel(self.config.inbound_capacity);
                            self.reader = Some(tokio::spawn(read_loop(read, tx)));
                            self.writer = Some(writer);
                            self.inbound = Some(rx);
                            info!(url = %self.config.url, "connected to broker");
                            return Ok(());
                        }
                        Err(e) => last_failure = e.to_string(),
                    }
                }
                Err(e) => last_failure = e.to_string(),
            }

            if attempt < attempts {
                warn!(attempt, failure = %last_failure, "connect attempt failed, retrying");
                sleep(self.config.retry_delay).await;
            }
        }

        Err(TransportError::ConnectFailed {
            attempts,
            reason: last_failure,
        })
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        if let Some(mut writer) = self.writer.take() {
            // Best-effort close; the peer may already be gone.
            let _ = writer.close().await;
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.inbound = None;
        info!("disconnected from broker");
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        debug!(topic, "subscribing");
        self.send_frame(&Frame::Subscribe {
            topic: topic.to_string(),
        })
        .await
    }

    async fn publish(&mut self, destination: &str, body: Value) -> Result<(), TransportError> {
        debug!(destination, "publishing");
        self.send_frame(&Frame::Send {
            destination: destination.to_string(),
            body,
        })
        .await
    }

    async fn recv(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        let Some(rx) = self.inbound.as_mut() else {
            return Ok(None);
        };
        match rx.recv().await {
            Some(message) => Ok(Some(message)),
            None => {
                // The reader loop ended: the peer closed or the socket
                // failed. Release the dead half so is_connected reports
                // false and a later connect can re-establish.
                self.writer = None;
                self.inbound = None;
                if let Some(reader) = self.reader.take() {
                    reader.abort();
                }
                warn!("connection lost");
                Ok(None)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.writer.is_some()
    }
}
