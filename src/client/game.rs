//! Game Client
//!
//! Coordinates the transport, subscription registry and session store,
//! and translates user intents into outgoing commands. All state lives in
//! this explicitly owned instance; inbound updates and outbound commands
//! interleave on the single task that owns it, so nothing here locks.
//!
//! Commands are fire-and-forget: a failed publish is logged and dropped,
//! recovery happens when the remote authority re-sends state. Intents
//! issued before readiness or without an active session are silent
//! no-ops; those preconditions hold in normal operation and the remote
//! peer is the authority anyway.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::registry::SubscriptionRegistry;
use crate::game::snapshot::{GameSnapshot, PlayerRef};
use crate::game::store::{Notice, SessionStore, UpdateKind};
use crate::network::protocol::{
    ConnectCommand, JoinResponseCommand, MoveCommand, RematchCommand,
    RematchResponseCommand, StartCommand, SurrenderCommand, SurrenderResponseCommand,
};
use crate::network::topics;
use crate::network::transport::{InboundMessage, Transport, TransportError};

/// Real-time session synchronization client.
///
/// Create one per identity lifetime, hand it a connected-capable
/// transport, call [`GameClient::connect`], then alternate intents and
/// [`GameClient::poll_update`] from a single task.
pub struct GameClient<T: Transport> {
    transport: T,
    identity: Option<String>,
    registry: SubscriptionRegistry,
    store: SessionStore,
}

impl<T: Transport> GameClient<T> {
    /// Create a client around an owned transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            identity: None,
            registry: SubscriptionRegistry::new(),
            store: SessionStore::new(),
        }
    }

    // -- lifecycle ---------------------------------------------------------

    /// Bind an identity and establish the connection.
    ///
    /// Completes only after the transport confirms readiness and every
    /// personal topic is subscribed; no command can be published earlier.
    /// An empty identity is a no-op: nothing connects until a real one is
    /// bound. Topics are marked active only once their subscribe
    /// succeeds, so a failed connect can be retried.
    pub async fn connect(&mut self, identity: impl Into<String>) -> Result<(), TransportError> {
        let identity = identity.into();
        if identity.is_empty() {
            debug!("connect without identity, suppressed");
            return Ok(());
        }
        self.transport.connect().await?;
        for topic in self.registry.pending_personal_topics(&identity) {
            self.transport.subscribe(&topic).await?;
            self.registry.mark_active(topic);
        }
        info!(%identity, "session sync active");
        self.identity = Some(identity);
        Ok(())
    }

    /// Clear the identity: disconnect the transport, release every
    /// subscription and drop all local session state.
    pub async fn clear_identity(&mut self) {
        if let Err(e) = self.transport.disconnect().await {
            warn!(error = %e, "disconnect failed during teardown");
        }
        self.registry.clear();
        self.store.clear();
        self.identity = None;
        debug!("identity cleared, session state torn down");
    }

    /// Active identity, if one is bound.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether the transport has confirmed readiness.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    // -- session state -----------------------------------------------------

    /// Last known session snapshot, if any.
    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.store.snapshot()
    }

    /// Whether this client awaits the owner's approval to join.
    pub fn join_pending(&self) -> bool {
        self.store.join_pending()
    }

    /// Take the pending user-visible notice, if any. The presentation
    /// layer polls this instead of being interrupted.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.store.take_notice()
    }

    /// Leave the current session locally. Publishes nothing.
    pub fn return_to_lobby(&mut self) {
        self.store.return_to_lobby();
    }

    // -- inbound -----------------------------------------------------------

    /// Wait for and apply the next inbound update.
    ///
    /// Returns `Ok(false)` once the connection is closed and no further
    /// updates will arrive.
    pub async fn poll_update(&mut self) -> Result<bool, TransportError> {
        match self.transport.recv().await? {
            Some(message) => {
                self.route(message).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Single entry point for all snapshot mutation.
    async fn route(&mut self, message: InboundMessage) {
        let Some(identity) = self.identity.clone() else {
            debug!(topic = %message.topic, "message after teardown, discarded");
            return;
        };
        let Some(kind) = topics::classify(&message.topic, &identity) else {
            debug!(topic = %message.topic, "unrecognized topic, discarded");
            return;
        };
        // A session-scoped topic we never subscribed is not ours.
        if kind == UpdateKind::Session && !self.registry.is_active(&message.topic) {
            debug!(topic = %message.topic, "unsubscribed session topic, discarded");
            return;
        }

        let snapshot = if kind == UpdateKind::JoinRejected {
            None
        } else {
            match serde_json::from_value::<GameSnapshot>(message.body) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(topic = %message.topic, error = %e, "undecodable snapshot, dropped");
                    return;
                }
            }
        };

        if let Some(session_id) = self.store.apply(kind, snapshot) {
            if let Some(topic) = self.registry.pending_session_topic(&session_id) {
                match self.transport.subscribe(&topic).await {
                    Ok(()) => self.registry.mark_active(topic),
                    Err(e) => {
                        // Left pending; the next session event retries it.
                        warn!(%topic, error = %e, "session topic subscribe failed");
                    }
                }
            }
        }
    }

    // -- intents -----------------------------------------------------------

    /// Create a new session owned by this identity.
    pub async fn create_game(&mut self) {
        let Some(identity) = self.acting_identity() else { return };
        self.publish(topics::DEST_START, &StartCommand { identity }).await;
    }

    /// Join any open session, or let the peer create one.
    pub async fn connect_to_random_game(&mut self) {
        let Some(identity) = self.acting_identity() else { return };
        let command = ConnectCommand {
            player: PlayerRef::new(identity),
            session_id: None,
        };
        self.publish(topics::DEST_CONNECT, &command).await;
    }

    /// Request to join a specific session.
    pub async fn connect_to_game_by_id(&mut self, session_id: impl Into<String>) {
        let Some(identity) = self.acting_identity() else { return };
        let command = ConnectCommand {
            player: PlayerRef::new(identity),
            session_id: Some(session_id.into()),
        };
        self.publish(topics::DEST_CONNECT, &command).await;
    }

    /// Place a mark on a square. Legality belongs to the remote peer.
    pub async fn make_move(&mut self, square_index: usize) {
        let Some((identity, session_id)) = self.active_session() else { return };
        let command = MoveCommand {
            identity,
            square_index,
            session_id,
        };
        self.publish(topics::DEST_GAMEPLAY, &command).await;
    }

    /// Propose to give up the current game.
    pub async fn request_surrender(&mut self) {
        let Some((identity, session_id)) = self.active_session() else { return };
        let command = SurrenderCommand { identity, session_id };
        self.publish(topics::DEST_SURRENDER, &command).await;
    }

    /// Answer the opponent's surrender proposal.
    pub async fn respond_to_surrender(&mut self, accepted: bool) {
        let Some((identity, session_id)) = self.active_session() else { return };
        let command = SurrenderResponseCommand {
            identity,
            session_id,
            accepted,
        };
        self.publish(topics::DEST_SURRENDER_RESPONSE, &command).await;
    }

    /// Answer a pending join request as the session owner.
    pub async fn respond_to_join_request(
        &mut self,
        requester_identity: impl Into<String>,
        accepted: bool,
    ) {
        let Some((identity, session_id)) = self.active_session() else { return };
        let command = JoinResponseCommand {
            responder_identity: identity,
            requester_identity: requester_identity.into(),
            session_id,
            accepted,
        };
        self.publish(topics::DEST_JOIN_RESPONSE, &command).await;
    }

    /// Propose a rematch after a finished game.
    pub async fn request_rematch(&mut self) {
        let Some((identity, session_id)) = self.active_session() else { return };
        let command = RematchCommand { identity, session_id };
        self.publish(topics::DEST_REMATCH, &command).await;
    }

    /// Answer the opponent's rematch proposal.
    pub async fn respond_to_rematch(&mut self, accepted: bool) {
        let Some((identity, session_id)) = self.active_session() else { return };
        let command = RematchResponseCommand {
            identity,
            session_id,
            accepted,
        };
        self.publish(topics::DEST_REMATCH_RESPONSE, &command).await;
    }

    // -- guards & plumbing -------------------------------------------------

    /// Identity to act as, present only when non-empty and ready.
    fn acting_identity(&self) -> Option<String> {
        if !self.transport.is_connected() {
            debug!("intent before readiness, suppressed");
            return None;
        }
        let identity = self.identity.clone().filter(|id| !id.is_empty());
        if identity.is_none() {
            debug!("intent without identity, suppressed");
        }
        identity
    }

    /// Identity plus session id, present only with an active session.
    fn active_session(&self) -> Option<(String, String)> {
        let identity = self.acting_identity()?;
        match self.store.session_id() {
            Some(session_id) => Some((identity, session_id.to_string())),
            None => {
                debug!("session intent without snapshot, suppressed");
                None
            }
        }
    }

    async fn publish<P: Serialize>(&mut self, destination: &str, payload: &P) {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(e) => {
                warn!(destination, error = %e, "unserializable command, dropped");
                return;
            }
        };
        if let Err(e) = self.transport.publish(destination, body).await {
            warn!(destination, error = %e, "publish failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use serde_json::json;

    /// In-memory transport recording everything the client does.
    #[derive(Default)]
    struct MockTransport {
        connected: bool,
        refuse_connect: bool,
        failing_subscribes: u32,
        subscriptions: Vec<String>,
        published: Vec<(String, Value)>,
        inbound: VecDeque<InboundMessage>,
        disconnects: u32,
    }

    impl MockTransport {
        fn deliver(&mut self, topic: &str, body: Value) {
            self.inbound.push_back(InboundMessage {
                topic: topic.to_string(),
                body,
            });
        }
    }

    impl Transport for MockTransport {
        async fn connect(&mut self) -> Result<(), TransportError> {
            if self.refuse_connect {
                return Err(TransportError::ConnectFailed {
                    attempts: 1,
                    reason: "refused".into(),
                });
            }
            self.connected = true;
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<(), TransportError> {
            self.connected = false;
            self.disconnects += 1;
            Ok(())
        }

        async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            if self.failing_subscribes > 0 {
                self.failing_subscribes -= 1;
                return Err(TransportError::Broker("subscribe refused".into()));
            }
            self.subscriptions.push(topic.to_string());
            Ok(())
        }

        async fn publish(&mut self, destination: &str, body: Value) -> Result<(), TransportError> {
            if !self.connected {
                return Err(TransportError::NotConnected);
            }
            self.published.push((destination.to_string(), body));
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<InboundMessage>, TransportError> {
            Ok(self.inbound.pop_front())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    fn snapshot_body(session_id: &str, owner: &str) -> Value {
        json!({
            "sessionId": session_id,
            "board": [null, null, null, null, null, null, null, null, null],
            "status": "NEW",
            "player1": { "identity": owner },
            "player2": null
        })
    }

    async fn connected_client(identity: &str) -> GameClient<MockTransport> {
        let mut client = GameClient::new(MockTransport::default());
        client.connect(identity).await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_connect_subscribes_personal_topics() {
        let client = connected_client("Alice").await;
        assert_eq!(client.transport.subscriptions.len(), 7);
        assert!(client
            .transport
            .subscriptions
            .contains(&"game.join.pending.Alice".to_string()));
    }

    #[tokio::test]
    async fn test_scenario_a_create_game() {
        let mut client = connected_client("Alice").await;

        client.create_game().await;
        assert_eq!(
            client.transport.published[0],
            ("game.start".to_string(), json!({ "identity": "Alice" }))
        );

        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        assert!(client.poll_update().await.unwrap());

        let snapshot = client.snapshot().unwrap();
        assert_eq!(snapshot.session_id, "g1");
        assert_eq!(snapshot.player1.identity, "Alice");
        assert!(client.transport.subscriptions.contains(&"game.g1".to_string()));
    }

    #[tokio::test]
    async fn test_scenario_b_make_move() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();

        client.make_move(4).await;
        let (destination, body) = client.transport.published.last().unwrap();
        assert_eq!(destination, "game.gameplay");
        assert_eq!(
            *body,
            json!({ "identity": "Alice", "squareIndex": 4, "sessionId": "g1" })
        );
    }

    #[tokio::test]
    async fn test_scenario_c_join_rejected() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.join.pending.Alice", snapshot_body("g1", "Bob"));
        client.poll_update().await.unwrap();
        assert!(client.join_pending());

        client.transport.deliver("game.join.rejected.Alice", json!({}));
        client.poll_update().await.unwrap();

        assert!(client.snapshot().is_none());
        assert!(!client.join_pending());
        assert_eq!(client.take_notice(), Some(Notice::JoinRejected));
    }

    #[tokio::test]
    async fn test_scenario_d_decline_surrender() {
        let mut client = connected_client("Bob").await;
        client
            .transport
            .deliver("game.connected.Bob", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();

        client.respond_to_surrender(false).await;
        let (destination, body) = client.transport.published.last().unwrap();
        assert_eq!(destination, "game.surrender.response");
        assert_eq!(
            *body,
            json!({ "identity": "Bob", "sessionId": "g1", "accepted": false })
        );
    }

    #[tokio::test]
    async fn test_empty_identity_is_suppressed() {
        let mut client = GameClient::new(MockTransport::default());
        client.connect("").await.unwrap();

        assert!(!client.is_connected());
        assert!(client.identity().is_none());
        assert!(client.transport.subscriptions.is_empty());

        client.create_game().await;
        client.connect_to_random_game().await;
        assert!(client.transport.published.is_empty());
    }

    #[tokio::test]
    async fn test_retried_connect_subscribes_all_personal_topics() {
        let mut client = GameClient::new(MockTransport {
            failing_subscribes: 1,
            ..Default::default()
        });

        // First attempt dies mid-way through the subscription loop.
        assert!(client.connect("Alice").await.is_err());
        assert!(client.identity().is_none());

        // The retry must pick up every topic the first attempt missed.
        client.connect("Alice").await.unwrap();
        assert_eq!(client.transport.subscriptions.len(), 7);
        assert_eq!(client.identity(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_failed_session_bind_is_retried_on_next_session_event() {
        let mut client = connected_client("Alice").await;
        client.transport.failing_subscribes = 1;

        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();
        assert!(!client.transport.subscriptions.contains(&"game.g1".to_string()));

        client
            .transport
            .deliver("game.connected.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();
        assert!(client.transport.subscriptions.contains(&"game.g1".to_string()));
    }

    #[tokio::test]
    async fn test_no_publish_before_readiness() {
        let mut client = GameClient::new(MockTransport {
            refuse_connect: true,
            ..Default::default()
        });
        assert!(client.connect("Alice").await.is_err());

        client.create_game().await;
        client.connect_to_random_game().await;
        assert!(client.transport.published.is_empty());
    }

    #[tokio::test]
    async fn test_session_intents_are_noops_without_snapshot() {
        let mut client = connected_client("Alice").await;
        let baseline = client.transport.published.len();

        client.make_move(0).await;
        client.request_surrender().await;
        client.respond_to_surrender(true).await;
        client.respond_to_join_request("Bob", true).await;
        client.request_rematch().await;
        client.respond_to_rematch(true).await;

        assert_eq!(client.transport.published.len(), baseline);
    }

    #[tokio::test]
    async fn test_join_by_id_then_connected_clears_pending() {
        let mut client = connected_client("Bob").await;

        client.connect_to_game_by_id("g1").await;
        assert_eq!(
            client.transport.published[0],
            (
                "game.connect".to_string(),
                json!({ "player": { "identity": "Bob" }, "sessionId": "g1" })
            )
        );

        client
            .transport
            .deliver("game.join.pending.Bob", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();
        assert!(client.join_pending());

        client
            .transport
            .deliver("game.connected.Bob", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();
        assert!(!client.join_pending());
        assert!(client.transport.subscriptions.contains(&"game.g1".to_string()));
    }

    #[tokio::test]
    async fn test_join_random_omits_session_id() {
        let mut client = connected_client("Bob").await;
        client.connect_to_random_game().await;
        let (destination, body) = client.transport.published.last().unwrap();
        assert_eq!(destination, "game.connect");
        assert_eq!(*body, json!({ "player": { "identity": "Bob" } }));
    }

    #[tokio::test]
    async fn test_respond_to_join_request_payload() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();

        client.respond_to_join_request("Bob", true).await;
        let (destination, body) = client.transport.published.last().unwrap();
        assert_eq!(destination, "game.join.response");
        assert_eq!(
            *body,
            json!({
                "responderIdentity": "Alice",
                "requesterIdentity": "Bob",
                "sessionId": "g1",
                "accepted": true
            })
        );
    }

    #[tokio::test]
    async fn test_last_write_wins_across_channels() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();

        // Session channel and personal channel disagree; the later
        // delivery wins no matter which channel carried it.
        client.transport.deliver("game.g1", snapshot_body("g1", "Alice"));
        client
            .transport
            .deliver("game.updated.Alice", snapshot_body("g2", "Alice"));
        client.poll_update().await.unwrap();
        client.poll_update().await.unwrap();

        assert_eq!(client.snapshot().unwrap().session_id, "g2");
    }

    #[tokio::test]
    async fn test_rematch_accepted_binds_new_session_topic() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();

        client
            .transport
            .deliver("game.rematch.accepted.Alice", snapshot_body("g2", "Alice"));
        client.poll_update().await.unwrap();

        assert_eq!(client.snapshot().unwrap().session_id, "g2");
        assert!(client.transport.subscriptions.contains(&"game.g2".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_session_bind_subscribes_once() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        // A second bind-triggering event for the same session.
        client
            .transport
            .deliver("game.connected.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();
        client.poll_update().await.unwrap();

        let session_subscribes = client
            .transport
            .subscriptions
            .iter()
            .filter(|t| *t == "game.g1")
            .count();
        assert_eq!(session_subscribes, 1);
    }

    #[tokio::test]
    async fn test_clear_identity_tears_everything_down() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();

        client.clear_identity().await;
        assert!(!client.is_connected());
        assert!(client.snapshot().is_none());
        assert!(!client.join_pending());
        assert!(client.identity().is_none());
        assert_eq!(client.transport.disconnects, 1);
    }

    #[tokio::test]
    async fn test_in_flight_message_after_teardown_is_discarded() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.clear_identity().await;

        // The queued message is still delivered by the transport, but the
        // store must stay empty.
        client.poll_update().await.unwrap();
        assert!(client.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribed_session_topic_is_discarded() {
        let mut client = connected_client("Alice").await;
        client.transport.deliver("game.g9", snapshot_body("g9", "Mallory"));
        client.poll_update().await.unwrap();
        assert!(client.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_snapshot_is_dropped() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.updated.Alice", json!({ "sessionId": 42 }));
        client.poll_update().await.unwrap();
        assert!(client.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_return_to_lobby_publishes_nothing() {
        let mut client = connected_client("Alice").await;
        client
            .transport
            .deliver("game.created.Alice", snapshot_body("g1", "Alice"));
        client.poll_update().await.unwrap();
        let baseline = client.transport.published.len();

        client.return_to_lobby();
        assert!(client.snapshot().is_none());
        assert_eq!(client.transport.published.len(), baseline);
    }
}
