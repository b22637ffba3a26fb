//! Session State Store
//!
//! Holds the single current snapshot (or none) and applies inbound
//! updates atomically. An update always replaces the snapshot wholesale;
//! the most recently delivered message wins regardless of which channel
//! carried it.

use tracing::{debug, warn};

use crate::game::snapshot::GameSnapshot;

/// Semantic category of an inbound session update, derived from the
/// channel that delivered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// This identity joined a session successfully.
    Connected,
    /// This identity created a new session.
    Created,
    /// Someone requests to join this identity's session.
    JoinRequest,
    /// This identity's join request awaits the owner's approval.
    JoinPending,
    /// The owner rejected this identity's join request.
    JoinRejected,
    /// Generic session change addressed to this identity.
    Updated,
    /// Rematch accepted, a brand-new session replaces the old one.
    RematchAccepted,
    /// Update delivered on a session-scoped channel.
    Session,
}

/// A user-visible event the presentation layer polls and renders.
///
/// Replaces the blocking acknowledgment of the original design: the core
/// never blocks waiting for the user to dismiss anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The session owner rejected this identity's join request.
    JoinRejected,
}

/// The single mutable slot holding the last known session state.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Most recently received snapshot, if any.
    snapshot: Option<GameSnapshot>,
    /// True while this client awaits the owner's approval to join.
    join_pending: bool,
    /// Pending user-visible notice, consumed by the presentation layer.
    notice: Option<Notice>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one inbound update.
    ///
    /// Returns the session identifier when the update's category requires
    /// (re)binding the session channel (creation, successful join, rematch
    /// acceptance), so the caller can subscribe to it.
    pub fn apply(
        &mut self,
        kind: UpdateKind,
        snapshot: Option<GameSnapshot>,
    ) -> Option<String> {
        match kind {
            UpdateKind::JoinRejected => {
                // The rejection carries no usable session; drop everything.
                self.snapshot = None;
                self.join_pending = false;
                self.notice = Some(Notice::JoinRejected);
                debug!("join rejected, session state cleared");
                None
            }
            _ => {
                let Some(snapshot) = snapshot else {
                    warn!(?kind, "update without snapshot payload, ignored");
                    return None;
                };

                let session_id = snapshot.session_id.clone();
                debug!(?kind, %session_id, "replacing snapshot");
                self.snapshot = Some(snapshot);

                match kind {
                    UpdateKind::Connected => {
                        self.join_pending = false;
                        Some(session_id)
                    }
                    UpdateKind::Created | UpdateKind::RematchAccepted => Some(session_id),
                    UpdateKind::JoinPending => {
                        self.join_pending = true;
                        None
                    }
                    _ => None,
                }
            }
        }
    }

    /// Current snapshot, if any.
    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    /// Identifier of the current session, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|s| s.session_id.as_str())
    }

    /// Whether this client awaits the owner's approval to join.
    pub fn join_pending(&self) -> bool {
        self.join_pending
    }

    /// Take the pending notice, leaving the slot empty.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Leave the current session locally without notifying the remote peer.
    pub fn return_to_lobby(&mut self) {
        self.snapshot = None;
        self.join_pending = false;
    }

    /// Drop all state, including any pending notice. Used on teardown.
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.join_pending = false;
        self.notice = None;
    }
}
