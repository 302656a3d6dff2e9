// SockLink - Resilient WebSocket Session Client
use anyhow::Context;
use clap::Parser;
use socklink::cli::args::Args;
use socklink::cli::commands::execute_command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    execute_command(args).await.context("socklink failed")?;
    Ok(())
}
