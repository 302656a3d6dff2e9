use crate::core::communication::transport::{Transport, TransportEvent, TransportLink};
use crate::domain::error::{SockLinkError, SockLinkResult};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tracing::{debug, info, warn};

/// WebSocket transport backed by tokio-tungstenite
///
/// Each `connect` call performs one WebSocket handshake and spawns a
/// writer/reader task pair bridging the socket to the returned link.
/// Dropping the link closes the outbound channel, which makes the writer
/// send a close frame and tear the connection down.
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> SockLinkResult<TransportLink> {
        let (stream, response) =
            connect_async(url)
                .await
                .map_err(|e| SockLinkError::ConnectFailed {
                    message: format!("Failed to connect to {}: {}", url, e),
                })?;

        info!("WebSocket connection established to {}", url);
        debug!("WebSocket handshake response status: {}", response.status());

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<TransportEvent>();

        // TX task - drains the outbound queue in FIFO order
        tokio::spawn(async move {
            while let Some(text) = out_rx.recv().await {
                if let Err(e) = sink.send(WsMessage::Text(text)).await {
                    warn!("Failed to write WebSocket frame: {}", e);
                    break;
                }
            }

            // Outbound queue closed: start the closing handshake
            if let Err(e) = sink.send(WsMessage::Close(None)).await {
                debug!("Failed to send close frame: {}", e);
            }
            let _ = sink.close().await;
        });

        // RX task - forwards inbound frames as transport events
        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                let event = match frame {
                    Ok(WsMessage::Text(text)) => TransportEvent::Message(text),
                    Ok(WsMessage::Close(close_frame)) => {
                        let reason = close_frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                        let _ = event_tx.send(TransportEvent::Closed { reason });
                        break;
                    }
                    Ok(WsMessage::Binary(_)) => {
                        debug!("Ignoring binary WebSocket frame");
                        continue;
                    }
                    // Protocol-level ping/pong and raw frames are handled by
                    // the WebSocket layer itself
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                        break;
                    }
                };

                if event_tx.send(event).is_err() {
                    break;
                }
            }
            debug!("WebSocket reader task finished");
        });

        Ok(TransportLink::new(out_tx, event_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[tokio::test]
    async fn test_ws_round_trip_with_echo_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            if let Some(Ok(frame)) = ws.next().await {
                ws.send(frame).await.unwrap();
            }
            let _ = ws.close(None).await;
        });

        let transport = WsTransport::new();
        let mut link = transport
            .connect(&format!("ws://{}/ws", addr))
            .await
            .unwrap();

        link.send("hello".to_string()).unwrap();
        match link.next_event().await {
            Some(TransportEvent::Message(text)) => assert_eq!(text, "hello"),
            other => panic!("expected echoed message, got {:?}", other),
        }

        drop(link);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_ws_peer_close_surfaces_closed_event() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.close(None).await.unwrap();
            // Drain until the close handshake completes
            while let Some(Ok(_)) = ws.next().await {}
        });

        let transport = WsTransport::new();
        let mut link = transport
            .connect(&format!("ws://{}/ws", addr))
            .await
            .unwrap();

        match link.next_event().await {
            Some(TransportEvent::Closed { .. }) => {}
            other => panic!("expected closed event, got {:?}", other),
        }

        drop(link);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_ws_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = WsTransport::new();
        let result = transport.connect(&format!("ws://{}/ws", addr)).await;
        assert!(matches!(result, Err(SockLinkError::ConnectFailed { .. })));
    }
}
