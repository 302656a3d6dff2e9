use crate::cli::args::{Args, Command, ConfigCommand, ConnectArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::session::{InboundEvent, SessionManager, SessionStatus};
use crate::domain::config::{Endpoint, SockLinkConfig};
use crate::domain::error::{SockLinkError, SockLinkResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// Execute CLI command
pub async fn execute_command(args: Args) -> SockLinkResult<()> {
    let writer = ConsoleWriter::new(args.output.clone());

    let config_manager = ConfigManager::new()?;
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(Path::new(config_path))?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        let level = if args.verbose {
            "debug"
        } else {
            config.global.log_level.as_str()
        };
        if let Err(e) = logging::init_logging(level) {
            eprintln!("Failed to initialize logging: {}", e);
        }
    }

    match args.command {
        Command::Connect(connect_args) => execute_connect(connect_args, &writer, &config).await,
        Command::Endpoints => writer.write_endpoints(&config.endpoints),
        Command::Config(config_args) => {
            execute_config_command(config_args.command, &writer, &config, &config_manager)
        }
        Command::Version => writer.write_message(&format!("socklink {}", env!("CARGO_PKG_VERSION"))),
    }
}

/// Interactive session: stream events to the console, forward stdin lines
async fn execute_connect(
    args: ConnectArgs,
    writer: &ConsoleWriter,
    config: &SockLinkConfig,
) -> SockLinkResult<()> {
    let (endpoint, token) = resolve_target(&args.target, args.token, config)?;

    let mut session_config = config.global.session.clone();
    if let Some(heartbeat_ms) = args.heartbeat_ms {
        session_config.heartbeat_interval_ms = heartbeat_ms;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        session_config.connect_timeout_ms = timeout_ms;
    }

    let manager = SessionManager::with_config(endpoint, token, session_config);
    let mut subscription = manager.subscribe();
    manager.start().await?;

    writer.write_message(&format!(
        "Session {} -> {} (Ctrl-D or /quit to exit)",
        manager.session_id(),
        manager.endpoint()
    ))?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            event = subscription.recv() => match event {
                Some(event) => {
                    let stopped = matches!(
                        event,
                        InboundEvent::Lifecycle { state: SessionStatus::Stopped, .. }
                    );
                    writer.write_event(&event)?;
                    if stopped {
                        break;
                    }
                }
                None => break,
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line == "/quit" {
                        break;
                    }
                    if let Err(e) = manager.send(line).await {
                        writer.write_message(&format!("Send failed: {}", e))?;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            },
        }
    }

    manager.stop().await?;
    writer.write_stats(&manager.stats().await)?;
    Ok(())
}

/// Resolve a raw URL or a configured endpoint name into an endpoint and
/// login token
fn resolve_target(
    target: &str,
    token: Option<String>,
    config: &SockLinkConfig,
) -> SockLinkResult<(Endpoint, String)> {
    if target.starts_with("ws://") || target.starts_with("wss://") {
        let endpoint = Endpoint::parse(target)?;
        let token = token.ok_or_else(|| SockLinkError::Config {
            message: "A login token is required for raw URLs (use --token)".to_string(),
        })?;
        return Ok((endpoint, token));
    }

    let entry = config
        .endpoints
        .iter()
        .find(|e| e.name == target)
        .ok_or_else(|| SockLinkError::Config {
            message: format!("Unknown endpoint '{}'", target),
        })?;

    let endpoint = Endpoint::parse(&entry.url)?;
    Ok((endpoint, token.unwrap_or_else(|| entry.token.clone())))
}

fn execute_config_command(
    command: ConfigCommand,
    writer: &ConsoleWriter,
    config: &SockLinkConfig,
    config_manager: &ConfigManager,
) -> SockLinkResult<()> {
    match command {
        ConfigCommand::Show => writer.write_config(config),
        ConfigCommand::Validate { file } => {
            match file {
                Some(path) => {
                    config_manager.load_config_from_path(Path::new(&path))?;
                }
                None => {
                    config_manager.load_config()?;
                }
            }
            writer.write_message("Configuration is valid")
        }
        ConfigCommand::Init => {
            let current_dir = std::env::current_dir().map_err(|e| SockLinkError::Config {
                message: format!("Failed to resolve current directory: {}", e),
            })?;
            config_manager.init_project_config(&current_dir)?;
            writer.write_message("Created .socklink/config.toml")
        }
    }
}
