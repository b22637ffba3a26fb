//! Subscription Registry
//!
//! Bookkeeping for the set of topics the active identity listens on.
//! Personal topics are derived from the identity right after connecting;
//! the session topic is bound lazily once a session identifier is known.
//! A topic counts as active only once the caller confirms its transport
//! subscribe succeeded, and an active topic is never handed out again,
//! so a failed subscribe stays retryable and no handler can be stacked
//! twice.

use std::collections::HashSet;

use crate::network::topics;

/// Tracks which topics are currently subscribed.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    active: HashSet<String>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Personal topics of `identity` that are not active yet and need a
    /// transport subscribe. Does not change the registry; confirm each
    /// successful subscribe with [`SubscriptionRegistry::mark_active`].
    pub fn pending_personal_topics(&self, identity: &str) -> Vec<String> {
        topics::personal_topics(identity)
            .into_iter()
            .filter(|topic| !self.active.contains(topic))
            .collect()
    }

    /// The session topic for `session_id` when it is not active yet.
    /// Rebinding an already-active session yields nothing.
    pub fn pending_session_topic(&self, session_id: &str) -> Option<String> {
        let topic = topics::session_topic(session_id);
        (!self.active.contains(&topic)).then_some(topic)
    }

    /// Record a topic as active once its transport subscribe succeeded.
    pub fn mark_active(&mut self, topic: String) {
        self.active.insert(topic);
    }

    /// Whether a topic is currently active.
    pub fn is_active(&self, topic: &str) -> bool {
        self.active.contains(topic)
    }

    /// Number of active topics.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no topic is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Forget every binding. Used on disconnect; the transport has already
    /// released the underlying registrations.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}
