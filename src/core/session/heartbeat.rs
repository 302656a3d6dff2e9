use tokio::time::Instant;

/// Liveness accounting for one physical connection
///
/// Reset on every new connection. The session sends a ping per interval and
/// records the acknowledgement; once `threshold` pings are outstanding the
/// link is treated as dead.
#[derive(Debug)]
pub struct HeartbeatState {
    last_ping_sent: Option<Instant>,
    last_pong_received: Option<Instant>,
    outstanding: u32,
}

impl HeartbeatState {
    pub fn new() -> Self {
        Self {
            last_ping_sent: None,
            last_pong_received: None,
            outstanding: 0,
        }
    }

    /// Reset state for a new physical connection
    pub fn reset(&mut self) {
        self.last_ping_sent = None;
        self.last_pong_received = None;
        self.outstanding = 0;
    }

    pub fn record_ping_sent(&mut self) {
        self.last_ping_sent = Some(Instant::now());
        self.outstanding += 1;
    }

    /// Record an acknowledgement; returns false for a pong no ping is
    /// waiting on
    pub fn record_pong_received(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        self.outstanding -= 1;
        self.last_pong_received = Some(Instant::now());
        true
    }

    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    /// Whether the connection should be treated as dead
    pub fn is_expired(&self, threshold: u32) -> bool {
        self.outstanding >= threshold
    }

    pub fn last_ping_sent(&self) -> Option<Instant> {
        self.last_ping_sent
    }

    pub fn last_pong_received(&self) -> Option<Instant> {
        self.last_pong_received
    }
}

impl Default for HeartbeatState {
    fn default() -> Self {
        Self::new()
    }
}
