//! SockLink Library
//!
//! Resilient WebSocket session client providing automatic reconnection
//! with jittered exponential backoff, heartbeat liveness detection, and
//! ordered event delivery to any number of subscribers.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::communication::{Transport, TransportEvent, TransportLink};
pub use crate::core::session::{
    InboundEvent, SessionManager, SessionStats, SessionStatus, Subscription,
};
pub use crate::domain::config::{Endpoint, SessionConfig, SockLinkConfig};
pub use crate::domain::error::{SockLinkError, SockLinkResult};
