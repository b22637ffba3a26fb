//! Client Layer
//!
//! The session-synchronization client: subscription bookkeeping plus the
//! coordinator that turns user intents into commands and inbound
//! messages into state.

pub mod game;
pub mod registry;

pub use game::GameClient;
pub use registry::SubscriptionRegistry;
