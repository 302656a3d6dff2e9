use crate::cli::args::OutputFormat;
use crate::core::session::{InboundEvent, SessionStats};
use crate::domain::config::{EndpointConfig, SockLinkConfig};
use crate::domain::error::{SockLinkError, SockLinkResult};

/// Output abstraction for CLI results
pub trait OutputWriter {
    fn write_message(&self, message: &str) -> SockLinkResult<()>;
    fn write_event(&self, event: &InboundEvent) -> SockLinkResult<()>;
    fn write_endpoints(&self, endpoints: &[EndpointConfig]) -> SockLinkResult<()>;
    fn write_config(&self, config: &SockLinkConfig) -> SockLinkResult<()>;
    fn write_stats(&self, stats: &SessionStats) -> SockLinkResult<()>;
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

fn format_event_text(event: &InboundEvent) -> String {
    match event {
        InboundEvent::Lifecycle {
            state,
            reason: Some(reason),
        } => format!("[lifecycle] {} ({})", state, reason),
        InboundEvent::Lifecycle {
            state,
            reason: None,
        } => format!("[lifecycle] {}", state),
        InboundEvent::Data { payload } => format!("[data] {}", payload),
        InboundEvent::Error { detail } => format!("[error] {}", detail),
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_message(&self, message: &str) -> SockLinkResult<()> {
        println!("{}", message);
        Ok(())
    }

    fn write_event(&self, event: &InboundEvent) -> SockLinkResult<()> {
        match self.format {
            OutputFormat::Text => println!("{}", format_event_text(event)),
            OutputFormat::Json => {
                let output =
                    serde_json::to_string(event).map_err(|e| SockLinkError::Output(e.to_string()))?;
                println!("{}", output);
            }
        }
        Ok(())
    }

    fn write_endpoints(&self, endpoints: &[EndpointConfig]) -> SockLinkResult<()> {
        match self.format {
            OutputFormat::Text => {
                if endpoints.is_empty() {
                    println!("No endpoints configured");
                }
                for endpoint in endpoints {
                    if endpoint.description.is_empty() {
                        println!("{}  {}", endpoint.name, endpoint.url);
                    } else {
                        println!(
                            "{}  {}  ({})",
                            endpoint.name, endpoint.url, endpoint.description
                        );
                    }
                }
            }
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(endpoints)
                    .map_err(|e| SockLinkError::Output(e.to_string()))?;
                println!("{}", output);
            }
        }
        Ok(())
    }

    fn write_config(&self, config: &SockLinkConfig) -> SockLinkResult<()> {
        match self.format {
            OutputFormat::Text => {
                let output = toml::to_string_pretty(config)
                    .map_err(|e| SockLinkError::Output(e.to_string()))?;
                println!("{}", output);
            }
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(config)
                    .map_err(|e| SockLinkError::Output(e.to_string()))?;
                println!("{}", output);
            }
        }
        Ok(())
    }

    fn write_stats(&self, stats: &SessionStats) -> SockLinkResult<()> {
        match self.format {
            OutputFormat::Text => {
                println!(
                    "Connections: {}, sent: {}, received: {}, pings: {}, pongs: {}",
                    stats.connections,
                    stats.messages_sent,
                    stats.messages_received,
                    stats.pings_sent,
                    stats.pongs_received
                );
            }
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(stats)
                    .map_err(|e| SockLinkError::Output(e.to_string()))?;
                println!("{}", output);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::SessionStatus;

    #[test]
    fn test_event_text_formatting() {
        let event = InboundEvent::Lifecycle {
            state: SessionStatus::Connected,
            reason: None,
        };
        assert_eq!(format_event_text(&event), "[lifecycle] Connected");

        let event = InboundEvent::Lifecycle {
            state: SessionStatus::Disconnected,
            reason: Some("Heartbeat timeout".to_string()),
        };
        assert_eq!(
            format_event_text(&event),
            "[lifecycle] Disconnected (Heartbeat timeout)"
        );

        let event = InboundEvent::Data {
            payload: "hello".to_string(),
        };
        assert_eq!(format_event_text(&event), "[data] hello");

        let event = InboundEvent::Error {
            detail: "boom".to_string(),
        };
        assert_eq!(format_event_text(&event), "[error] boom");
    }

    #[test]
    fn test_writers_do_not_fail() {
        let writer = ConsoleWriter::new(OutputFormat::Json);
        let event = InboundEvent::Data {
            payload: "x".to_string(),
        };

        assert!(writer.write_message("hi").is_ok());
        assert!(writer.write_event(&event).is_ok());
        assert!(writer.write_endpoints(&[]).is_ok());
        assert!(writer.write_stats(&SessionStats::default()).is_ok());
    }
}
