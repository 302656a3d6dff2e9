use crate::domain::error::{SockLinkError, SockLinkResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SockLink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SockLinkConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Named endpoint configurations
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Session tuning applied to every connection
    #[serde(default)]
    pub session: SessionConfig,
}

/// Tuning parameters for a single session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Connection attempt timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Heartbeat ping interval in milliseconds
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,
    /// Consecutive unacknowledged pings before the link is declared dead
    #[serde(default = "default_liveness_threshold")]
    pub liveness_threshold: u32,
    /// Base reconnect delay in milliseconds
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    /// Maximum reconnect delay in milliseconds
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
    /// Jitter fraction applied to reconnect delays (0.0 to 1.0)
    #[serde(default = "default_backoff_jitter")]
    pub backoff_jitter: f64,
    /// Maximum number of queued outbound messages
    #[serde(default = "default_send_queue_capacity")]
    pub send_queue_capacity: usize,
}

/// Named endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint name
    pub name: String,
    /// WebSocket URL (ws:// or wss://)
    pub url: String,
    /// Login token sent in the connection handshake
    pub token: String,
    /// Endpoint description
    #[serde(default)]
    pub description: String,
}

/// Validated WebSocket endpoint address
///
/// Immutable for the lifetime of a session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    /// Parse and validate an endpoint URL
    pub fn parse(url: &str) -> SockLinkResult<Self> {
        let rest = url
            .strip_prefix("ws://")
            .or_else(|| url.strip_prefix("wss://"))
            .ok_or_else(|| {
                SockLinkError::InvalidEndpoint(format!(
                    "'{}' must use the ws:// or wss:// scheme",
                    url
                ))
            })?;

        let host = rest.split('/').next().unwrap_or("");
        if host.is_empty() {
            return Err(SockLinkError::InvalidEndpoint(format!(
                "'{}' is missing a host",
                url
            )));
        }

        Ok(Self {
            url: url.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl std::str::FromStr for Endpoint {
    type Err = SockLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

impl Default for SockLinkConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            endpoints: Vec::new(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            heartbeat_interval_ms: default_heartbeat_interval(),
            liveness_threshold: default_liveness_threshold(),
            backoff_base_ms: default_backoff_base(),
            backoff_max_ms: default_backoff_max(),
            backoff_jitter: default_backoff_jitter(),
            send_queue_capacity: default_send_queue_capacity(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_heartbeat_interval() -> u64 {
    1_000
}

fn default_liveness_threshold() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    500
}

fn default_backoff_max() -> u64 {
    30_000
}

fn default_backoff_jitter() -> f64 {
    0.25
}

fn default_send_queue_capacity() -> usize {
    64
}
