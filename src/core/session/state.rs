use serde::{Deserialize, Serialize};

/// Session lifecycle status
///
/// A session cycles through `Connecting`, `Connected` and `Disconnected`
/// until it is stopped; `Stopped` is terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Initial state, no transport
    Idle,
    /// Transport handshake in progress
    Connecting,
    /// Transport open, heartbeat active
    Connected,
    /// Transport lost, reconnect pending
    Disconnected,
    /// Terminal, no resurrection
    Stopped,
}

impl SessionStatus {
    /// Whether moving from `self` to `next` is a legal lifecycle transition
    pub fn can_transition(self, next: SessionStatus) -> bool {
        use SessionStatus::{Connected, Connecting, Disconnected, Idle, Stopped};

        match (self, next) {
            (_, Stopped) => true,
            (Idle, Connecting) => true,
            (Connecting, Connected) => true,
            (Connecting, Disconnected) => true,
            (Connected, Disconnected) => true,
            (Disconnected, Connecting) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Stopped)
    }

    pub fn is_connected(self) -> bool {
        matches!(self, SessionStatus::Connected)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "Idle"),
            SessionStatus::Connecting => write!(f, "Connecting"),
            SessionStatus::Connected => write!(f, "Connected"),
            SessionStatus::Disconnected => write!(f, "Disconnected"),
            SessionStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Session counters accumulated across reconnect cycles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Successful physical connections
    pub connections: u64,
    /// Application payloads sent
    pub messages_sent: u64,
    /// Frames received from the transport
    pub messages_received: u64,
    /// Heartbeat pings sent
    pub pings_sent: u64,
    /// Heartbeat acknowledgements received
    pub pongs_received: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionStatus::{Connected, Connecting, Disconnected, Idle, Stopped};

    const ALL: [SessionStatus; 5] = [Idle, Connecting, Connected, Disconnected, Stopped];

    #[test]
    fn test_legal_transitions() {
        assert!(Idle.can_transition(Connecting));
        assert!(Connecting.can_transition(Connected));
        assert!(Connecting.can_transition(Disconnected));
        assert!(Connected.can_transition(Disconnected));
        assert!(Disconnected.can_transition(Connecting));
    }

    #[test]
    fn test_stopped_reachable_from_any_state() {
        for state in ALL {
            assert!(state.can_transition(Stopped));
        }
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!Idle.can_transition(Connected));
        assert!(!Idle.can_transition(Disconnected));
        assert!(!Connected.can_transition(Connecting));
        assert!(!Connected.can_transition(Idle));
        assert!(!Disconnected.can_transition(Connected));
        assert!(!Connecting.can_transition(Idle));
    }

    #[test]
    fn test_stopped_is_terminal() {
        for state in ALL {
            if state != Stopped {
                assert!(!Stopped.can_transition(state));
            }
        }
        assert!(Stopped.is_terminal());
        assert!(!Idle.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Idle.to_string(), "Idle");
        assert_eq!(Connecting.to_string(), "Connecting");
        assert_eq!(Connected.to_string(), "Connected");
        assert_eq!(Disconnected.to_string(), "Disconnected");
        assert_eq!(Stopped.to_string(), "Stopped");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&Connected).unwrap();
        assert_eq!(json, r#""connected""#);

        let parsed: SessionStatus = serde_json::from_str(r#""disconnected""#).unwrap();
        assert_eq!(parsed, Disconnected);
    }
}
