use crate::core::communication::{
    message::{self, Frame},
    transport::{Transport, TransportEvent, TransportLink},
};
use crate::core::session::{
    backoff::Backoff,
    event::{InboundEvent, SubscriberRegistry},
    heartbeat::HeartbeatState,
    state::{SessionStats, SessionStatus},
};
use crate::domain::{
    config::{Endpoint, SessionConfig},
    error::{SockLinkError, SockLinkResult},
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Queued outbound payload with its completion acknowledgement
pub(crate) struct OutboundMessage {
    pub payload: String,
    pub ack: oneshot::Sender<SockLinkResult<()>>,
}

/// Command sent from the public handle to the session driver
pub(crate) enum Command {
    Send(OutboundMessage),
    Stop { done: oneshot::Sender<()> },
}

/// Interruption observed while no transport is active
enum Interrupt {
    Stop(oneshot::Sender<()>),
    HandleDropped,
}

/// Outcome of a connection attempt
enum Establish {
    Link(TransportLink),
    Failed(SockLinkError),
    Interrupted(Interrupt),
}

/// Outcome of one connected phase
enum LinkExit {
    Disconnected { reason: String },
    Interrupted(Interrupt),
}

/// Internal driver that owns the transport across reconnect cycles
///
/// Runs as a single task: transport events, queued commands, the heartbeat
/// interval and the reconnect timer are multiplexed through `select!`, so
/// handler code never races with itself and inbound delivery order is the
/// transport's order.
pub(crate) struct SessionDriver {
    session_id: Uuid,
    endpoint: Endpoint,
    token: String,
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    subscribers: SubscriberRegistry,
    status: Arc<RwLock<SessionStatus>>,
    stats: Arc<RwLock<SessionStats>>,
    commands: mpsc::Receiver<Command>,
    heartbeat: HeartbeatState,
    backoff: Backoff,
}

impl SessionDriver {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session_id: Uuid,
        endpoint: Endpoint,
        token: String,
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        subscribers: SubscriberRegistry,
        status: Arc<RwLock<SessionStatus>>,
        stats: Arc<RwLock<SessionStats>>,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        let backoff = Backoff::new(
            config.backoff_base(),
            config.backoff_max(),
            config.backoff_jitter,
        );

        Self {
            session_id,
            endpoint,
            token,
            config,
            transport,
            subscribers,
            status,
            stats,
            commands,
            heartbeat: HeartbeatState::new(),
            backoff,
        }
    }

    pub(crate) async fn run(mut self) {
        info!(
            "Session {} started for endpoint {}",
            self.session_id, self.endpoint
        );

        loop {
            if let Some(interrupt) = self.drain_offline_commands() {
                self.finish(interrupt).await;
                return;
            }

            self.transition(SessionStatus::Connecting, None).await;

            match self.establish().await {
                Establish::Link(link) => {
                    self.heartbeat.reset();
                    self.backoff.reset();
                    self.stats.write().await.connections += 1;
                    self.transition(SessionStatus::Connected, None).await;

                    match self.drive_link(link).await {
                        LinkExit::Disconnected { reason } => {
                            self.transition(SessionStatus::Disconnected, Some(reason)).await;
                        }
                        LinkExit::Interrupted(interrupt) => {
                            self.finish(interrupt).await;
                            return;
                        }
                    }
                }
                Establish::Failed(err) => {
                    debug!("Session {}: connection attempt failed: {}", self.session_id, err);
                    self.subscribers.broadcast(&InboundEvent::Error {
                        detail: err.to_string(),
                    });
                    self.transition(SessionStatus::Disconnected, Some(err.to_string()))
                        .await;
                }
                Establish::Interrupted(interrupt) => {
                    self.finish(interrupt).await;
                    return;
                }
            }

            if let Some(interrupt) = self.wait_backoff().await {
                self.finish(interrupt).await;
                return;
            }
        }
    }

    /// Attempt one physical connection, bounded by the configured timeout
    /// and interruptible by `stop()`
    async fn establish(&mut self) -> Establish {
        let transport = Arc::clone(&self.transport);
        let url = self.endpoint.as_str().to_string();
        let connect = async move { transport.connect(&url).await };
        tokio::pin!(connect);

        let deadline = sleep(self.config.connect_timeout());
        tokio::pin!(deadline);

        loop {
            enum Step {
                Connected(SockLinkResult<TransportLink>),
                TimedOut,
                Command(Option<Command>),
            }

            let step = tokio::select! {
                result = &mut connect => Step::Connected(result),
                () = &mut deadline => Step::TimedOut,
                command = self.commands.recv() => Step::Command(command),
            };

            match step {
                Step::Connected(Ok(link)) => {
                    // The login handshake precedes every other outbound frame
                    // on this connection
                    return match link.send(message::login_frame(&self.token)) {
                        Ok(()) => Establish::Link(link),
                        Err(err) => Establish::Failed(err),
                    };
                }
                Step::Connected(Err(err)) => return Establish::Failed(err),
                Step::TimedOut => {
                    return Establish::Failed(SockLinkError::ConnectFailed {
                        message: format!(
                            "Connection attempt to {} timed out after {:?}",
                            self.endpoint,
                            self.config.connect_timeout()
                        ),
                    });
                }
                Step::Command(Some(Command::Send(outbound))) => {
                    let _ = outbound.ack.send(Err(SockLinkError::SendWhileDisconnected));
                }
                Step::Command(Some(Command::Stop { done })) => {
                    return Establish::Interrupted(Interrupt::Stop(done));
                }
                Step::Command(None) => {
                    return Establish::Interrupted(Interrupt::HandleDropped);
                }
            }
        }
    }

    /// Drive one connected phase until the link dies or the session stops
    async fn drive_link(&mut self, mut link: TransportLink) -> LinkExit {
        let period = self.config.heartbeat_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            enum Step {
                Tick,
                Transport(Option<TransportEvent>),
                Command(Option<Command>),
            }

            let step = tokio::select! {
                _ = ticker.tick() => Step::Tick,
                event = link.next_event() => Step::Transport(event),
                command = self.commands.recv() => Step::Command(command),
            };

            match step {
                Step::Tick => {
                    if let Err(err) = link.send(message::PING.to_string()) {
                        return LinkExit::Disconnected {
                            reason: err.to_string(),
                        };
                    }
                    self.heartbeat.record_ping_sent();
                    self.stats.write().await.pings_sent += 1;

                    if self.heartbeat.is_expired(self.config.liveness_threshold) {
                        let err = SockLinkError::HeartbeatTimeout {
                            missed: self.heartbeat.outstanding(),
                        };
                        warn!("Session {}: {}", self.session_id, err);
                        self.subscribers.broadcast(&InboundEvent::Error {
                            detail: err.to_string(),
                        });
                        // Dropping the link force-closes the transport
                        return LinkExit::Disconnected {
                            reason: err.to_string(),
                        };
                    }
                }
                Step::Transport(Some(TransportEvent::Message(text))) => {
                    self.handle_inbound(&text).await;
                }
                Step::Transport(Some(TransportEvent::Closed { reason })) => {
                    return LinkExit::Disconnected {
                        reason: reason.unwrap_or_else(|| "Connection closed by peer".to_string()),
                    };
                }
                Step::Transport(Some(TransportEvent::Error(detail))) => {
                    self.subscribers.broadcast(&InboundEvent::Error {
                        detail: detail.clone(),
                    });
                    return LinkExit::Disconnected { reason: detail };
                }
                Step::Transport(None) => {
                    return LinkExit::Disconnected {
                        reason: "Transport terminated".to_string(),
                    };
                }
                Step::Command(Some(Command::Send(outbound))) => match link.send(outbound.payload) {
                    Ok(()) => {
                        self.stats.write().await.messages_sent += 1;
                        let _ = outbound.ack.send(Ok(()));
                    }
                    Err(err) => {
                        let _ = outbound.ack.send(Err(SockLinkError::SendWhileDisconnected));
                        return LinkExit::Disconnected {
                            reason: err.to_string(),
                        };
                    }
                },
                Step::Command(Some(Command::Stop { done })) => {
                    drop(link);
                    return LinkExit::Interrupted(Interrupt::Stop(done));
                }
                Step::Command(None) => {
                    drop(link);
                    return LinkExit::Interrupted(Interrupt::HandleDropped);
                }
            }
        }
    }

    /// Sleep out the reconnect delay, still serving commands
    async fn wait_backoff(&mut self) -> Option<Interrupt> {
        let delay = self.backoff.next_delay();
        debug!(
            "Session {}: reconnecting in {:?} (attempt {})",
            self.session_id,
            delay,
            self.backoff.attempt()
        );

        let timer = sleep(delay);
        tokio::pin!(timer);

        loop {
            enum Step {
                Elapsed,
                Command(Option<Command>),
            }

            let step = tokio::select! {
                () = &mut timer => Step::Elapsed,
                command = self.commands.recv() => Step::Command(command),
            };

            match step {
                Step::Elapsed => return None,
                Step::Command(Some(Command::Send(outbound))) => {
                    let _ = outbound.ack.send(Err(SockLinkError::SendWhileDisconnected));
                }
                Step::Command(Some(Command::Stop { done })) => {
                    return Some(Interrupt::Stop(done));
                }
                Step::Command(None) => return Some(Interrupt::HandleDropped),
            }
        }
    }

    async fn handle_inbound(&mut self, text: &str) {
        self.stats.write().await.messages_received += 1;

        match message::decode(text) {
            Ok(Frame::Pong) => {
                if self.heartbeat.record_pong_received() {
                    self.stats.write().await.pongs_received += 1;
                } else {
                    debug!("Session {}: unsolicited pong ignored", self.session_id);
                }
            }
            Ok(Frame::Event(envelope)) => {
                if let Some(event) = envelope.event.as_deref() {
                    debug!("Session {}: tagged event '{}'", self.session_id, event);
                }
                self.subscribers.broadcast(&InboundEvent::Data {
                    payload: text.to_string(),
                });
            }
            Err(err) => {
                // Undecodable input is delivered raw, never dropped
                debug!("Session {}: {}", self.session_id, err);
                self.subscribers.broadcast(&InboundEvent::Data {
                    payload: text.to_string(),
                });
            }
        }
    }

    /// Fail payloads that were queued while no transport was active
    fn drain_offline_commands(&mut self) -> Option<Interrupt> {
        loop {
            match self.commands.try_recv() {
                Ok(Command::Send(outbound)) => {
                    let _ = outbound.ack.send(Err(SockLinkError::SendWhileDisconnected));
                }
                Ok(Command::Stop { done }) => return Some(Interrupt::Stop(done)),
                Err(_) => return None,
            }
        }
    }

    async fn transition(&self, next: SessionStatus, reason: Option<String>) {
        {
            let mut status = self.status.write().await;
            if *status == next {
                return;
            }
            if !status.can_transition(next) {
                warn!(
                    "Session {}: refusing illegal transition {} -> {}",
                    self.session_id, *status, next
                );
                return;
            }
            debug!("Session {}: {} -> {}", self.session_id, *status, next);
            *status = next;
        }

        self.subscribers
            .broadcast(&InboundEvent::Lifecycle { state: next, reason });
    }

    /// Terminate: fail leftover commands, emit the final lifecycle event,
    /// then acknowledge the stop
    async fn finish(&mut self, interrupt: Interrupt) {
        let mut done_acks = Vec::new();
        if let Interrupt::Stop(done) = interrupt {
            done_acks.push(done);
        }

        // Refuse new commands, then fail whatever is still queued
        self.commands.close();
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Send(outbound) => {
                    let _ = outbound.ack.send(Err(SockLinkError::Stopped));
                }
                Command::Stop { done } => done_acks.push(done),
            }
        }

        self.transition(SessionStatus::Stopped, None).await;
        info!("Session {} stopped", self.session_id);

        for done in done_acks {
            let _ = done.send(());
        }
    }
}
