use crate::domain::error::{SockLinkError, SockLinkResult};
use serde::{Deserialize, Serialize};

/// Reserved heartbeat request literal
pub const PING: &str = "ping";
/// Reserved heartbeat acknowledgement literal
pub const PONG: &str = "pong";
/// Reserved prefix for the login handshake
pub const LOGIN_PREFIX: &str = "login:";

/// Build the login handshake frame for an identity token
///
/// Sent exactly once per physical connection, before any other payload.
pub fn login_frame(token: &str) -> String {
    format!("{}{}", LOGIN_PREFIX, token)
}

/// JSON envelope used by the server for tagged application messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    /// Whether this envelope is a heartbeat acknowledgement
    pub fn is_pong(&self) -> bool {
        self.event.is_none() && self.message.as_deref() == Some(PONG)
    }
}

/// Decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Heartbeat acknowledgement, consumed by the session and never
    /// surfaced to subscribers
    Pong,
    /// Application payload carried in a well-formed envelope
    Event(Envelope),
}

/// Decode an inbound text frame
///
/// Undecodable text is an error here; the session layer delivers it to
/// subscribers as raw data rather than dropping it.
pub fn decode(text: &str) -> SockLinkResult<Frame> {
    if text == PONG {
        return Ok(Frame::Pong);
    }

    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| SockLinkError::MalformedPayload {
            message: e.to_string(),
        })?;

    if envelope.is_pong() {
        Ok(Frame::Pong)
    } else {
        Ok(Frame::Event(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_frame() {
        assert_eq!(login_frame("alice"), "login:alice");
        assert_eq!(login_frame(""), "login:");
    }

    #[test]
    fn test_decode_raw_pong() {
        assert_eq!(decode("pong").unwrap(), Frame::Pong);
    }

    #[test]
    fn test_decode_envelope_pong() {
        assert_eq!(decode(r#"{"message":"pong"}"#).unwrap(), Frame::Pong);
    }

    #[test]
    fn test_decode_tagged_event_is_not_pong() {
        // An event-tagged envelope is application data even if the message
        // field happens to say pong
        let frame = decode(r#"{"event":"presence","message":"pong"}"#).unwrap();
        match frame {
            Frame::Event(envelope) => {
                assert_eq!(envelope.event.as_deref(), Some("presence"));
                assert_eq!(envelope.message.as_deref(), Some("pong"));
            }
            other => panic!("expected event frame, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_plain_envelope() {
        let frame = decode(r#"{"message":"hello"}"#).unwrap();
        match frame {
            Frame::Event(envelope) => {
                assert!(envelope.event.is_none());
                assert_eq!(envelope.message.as_deref(), Some("hello"));
            }
            other => panic!("expected event frame, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let result = decode("not json");
        assert!(matches!(
            result,
            Err(SockLinkError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_non_object_json() {
        assert!(decode("42").is_err());
        assert!(decode(r#"["a","b"]"#).is_err());
    }

    #[test]
    fn test_envelope_ignores_unknown_fields() {
        let frame = decode(r#"{"event":"joined","message":"bob","room":"lobby"}"#).unwrap();
        assert!(matches!(frame, Frame::Event(_)));
    }
}
