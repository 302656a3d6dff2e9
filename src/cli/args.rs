use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

/// Command line arguments for SockLink
#[derive(Parser, Debug)]
#[command(
    name = "socklink",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resilient WebSocket session client",
    long_about = "A resilient WebSocket session client that maintains one logical connection across reconnect cycles, with heartbeat liveness detection and ordered event delivery."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to an endpoint and stream session events
    Connect(ConnectArgs),
    /// List configured endpoints
    Endpoints,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

/// Connect command arguments
#[derive(ClapArgs, Debug)]
pub struct ConnectArgs {
    /// Endpoint URL (ws:// or wss://) or a configured endpoint name
    pub target: String,

    /// Login token sent in the connection handshake
    #[arg(short, long)]
    pub token: Option<String>,

    /// Heartbeat interval in milliseconds
    #[arg(long)]
    pub heartbeat_ms: Option<u64>,

    /// Connection attempt timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate a configuration file
    Validate {
        /// Configuration file path
        file: Option<String>,
    },
    /// Create a default project configuration
    Init,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
