use thiserror::Error;

/// SockLink unified error type
#[derive(Error, Debug)]
pub enum SockLinkError {
    #[error("Connection failed: {message}")]
    ConnectFailed { message: String },

    #[error("Heartbeat timeout: {missed} consecutive pings unacknowledged")]
    HeartbeatTimeout { missed: u32 },

    #[error("Cannot send: session is not connected")]
    SendWhileDisconnected,

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Session is stopped")]
    Stopped,

    #[error("Output error: {0}")]
    Output(String),
}

pub type SockLinkResult<T> = Result<T, SockLinkError>;
