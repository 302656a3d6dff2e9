// WebSocket module - tokio-tungstenite transport
pub mod client;

pub use client::WsTransport;
