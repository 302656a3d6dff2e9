use crate::domain::error::{SockLinkError, SockLinkResult};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Event surfaced by a transport link
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Text frame received from the peer
    Message(String),
    /// Link closed, locally or by the peer
    Closed { reason: Option<String> },
    /// Transport-level failure
    Error(String),
}

/// Live link to a peer: a FIFO outbound sender paired with an ordered
/// inbound event stream.
///
/// Dropping the link tears the underlying connection down.
pub struct TransportLink {
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl TransportLink {
    pub fn new(
        outbound: mpsc::UnboundedSender<String>,
        events: mpsc::UnboundedReceiver<TransportEvent>,
    ) -> Self {
        Self { outbound, events }
    }

    /// Queue a text frame for transmission in FIFO order
    pub fn send(&self, text: String) -> SockLinkResult<()> {
        self.outbound.send(text).map_err(|_| SockLinkError::Transport {
            message: "Transport link is closed".to_string(),
        })
    }

    /// Receive the next transport event; `None` once the link is torn down
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

/// Connector trait for WebSocket-capable runtimes
///
/// Implementations establish one physical connection per call; the session
/// layer owns the returned link exclusively and drives every reconnect.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish a new physical connection to the endpoint URL
    async fn connect(&self, url: &str) -> SockLinkResult<TransportLink>;
}
