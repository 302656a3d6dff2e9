use crate::core::communication::transport::Transport;
use crate::core::session::{
    event::{SubscriberRegistry, Subscription},
    session::{Command, OutboundMessage, SessionDriver},
    state::{SessionStats, SessionStatus},
};
use crate::domain::{
    config::{Endpoint, SessionConfig},
    error::{SockLinkError, SockLinkResult},
};
use crate::infrastructure::ws::WsTransport;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use uuid::Uuid;

enum DriverState {
    Idle,
    Running { commands: mpsc::Sender<Command> },
    Stopped,
}

/// Resilient WebSocket session manager
///
/// Owns one logical connection over time, including reconnect cycles: it
/// drives the transport lifecycle and heartbeat internally and fans inbound
/// events out to subscribers in transport order. Callers never touch the
/// underlying socket.
///
/// A stopped manager cannot be restarted; construct a new one instead.
pub struct SessionManager {
    session_id: Uuid,
    endpoint: Endpoint,
    token: String,
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    subscribers: SubscriberRegistry,
    status: Arc<RwLock<SessionStatus>>,
    stats: Arc<RwLock<SessionStats>>,
    driver: RwLock<DriverState>,
}

impl SessionManager {
    /// Create a manager for an endpoint with the default WebSocket
    /// transport and configuration
    pub fn new(endpoint: Endpoint, token: impl Into<String>) -> Self {
        Self::with_transport(
            endpoint,
            token,
            SessionConfig::default(),
            Arc::new(WsTransport::new()),
        )
    }

    /// Create a manager with custom session tuning
    pub fn with_config(endpoint: Endpoint, token: impl Into<String>, config: SessionConfig) -> Self {
        Self::with_transport(endpoint, token, config, Arc::new(WsTransport::new()))
    }

    /// Create a manager over an arbitrary transport implementation
    pub fn with_transport(
        endpoint: Endpoint,
        token: impl Into<String>,
        config: SessionConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            endpoint,
            token: token.into(),
            config,
            transport,
            subscribers: SubscriberRegistry::new(),
            status: Arc::new(RwLock::new(SessionStatus::Idle)),
            stats: Arc::new(RwLock::new(SessionStats::default())),
            driver: RwLock::new(DriverState::Idle),
        }
    }

    /// Begin connecting
    ///
    /// Idempotent while the session is active. Fails with `Stopped` once
    /// `stop()` has been called.
    pub async fn start(&self) -> SockLinkResult<()> {
        let mut driver = self.driver.write().await;

        match &*driver {
            DriverState::Running { .. } => Ok(()),
            DriverState::Stopped => Err(SockLinkError::Stopped),
            DriverState::Idle => {
                let (commands_tx, commands_rx) =
                    mpsc::channel(self.config.send_queue_capacity.max(1));

                let session = SessionDriver::new(
                    self.session_id,
                    self.endpoint.clone(),
                    self.token.clone(),
                    self.config.clone(),
                    Arc::clone(&self.transport),
                    self.subscribers.clone(),
                    Arc::clone(&self.status),
                    Arc::clone(&self.stats),
                    commands_rx,
                );
                tokio::spawn(session.run());

                *driver = DriverState::Running {
                    commands: commands_tx,
                };
                Ok(())
            }
        }
    }

    /// Stop the session
    ///
    /// Closes the transport, cancels the heartbeat and any pending
    /// reconnect deterministically, and emits the final `Stopped`
    /// lifecycle event before returning. Idempotent.
    pub async fn stop(&self) -> SockLinkResult<()> {
        let mut driver = self.driver.write().await;

        match std::mem::replace(&mut *driver, DriverState::Stopped) {
            DriverState::Running { commands } => {
                let (done_tx, done_rx) = oneshot::channel();
                if commands.send(Command::Stop { done: done_tx }).await.is_ok() {
                    let _ = done_rx.await;
                }
            }
            DriverState::Idle => {
                // Never started: no driver to join, emit the terminal event
                // directly
                *self.status.write().await = SessionStatus::Stopped;
                self.subscribers.broadcast(
                    &crate::core::session::event::InboundEvent::Lifecycle {
                        state: SessionStatus::Stopped,
                        reason: None,
                    },
                );
            }
            DriverState::Stopped => {}
        }

        Ok(())
    }

    /// Enqueue a payload for transmission
    ///
    /// Flushes in FIFO order while connected; fails with
    /// `SendWhileDisconnected` otherwise and the payload is discarded.
    pub async fn send(&self, payload: impl Into<String>) -> SockLinkResult<()> {
        let commands = {
            let driver = self.driver.read().await;
            match &*driver {
                DriverState::Running { commands } => commands.clone(),
                _ => return Err(SockLinkError::SendWhileDisconnected),
            }
        };

        if !self.status.read().await.is_connected() {
            return Err(SockLinkError::SendWhileDisconnected);
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        commands
            .send(Command::Send(OutboundMessage {
                payload: payload.into(),
                ack: ack_tx,
            }))
            .await
            .map_err(|_| SockLinkError::SendWhileDisconnected)?;

        ack_rx
            .await
            .map_err(|_| SockLinkError::SendWhileDisconnected)?
    }

    /// Register a subscriber for session events
    ///
    /// Events arrive in delivery order; the subscription deregisters
    /// itself when dropped.
    pub fn subscribe(&self) -> Subscription {
        self.subscribers.subscribe()
    }

    /// Current lifecycle status
    pub async fn status(&self) -> SessionStatus {
        *self.status.read().await
    }

    /// Session counters accumulated across reconnect cycles
    pub async fn stats(&self) -> SessionStats {
        self.stats.read().await.clone()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}
