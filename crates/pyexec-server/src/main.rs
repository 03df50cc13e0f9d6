//! MCP stdio server exposing the `python-scraper-executor` tool
//!
//! Reads JSON-RPC on stdin and answers on stdout, so all logging goes to
//! stderr. The process only exits with an error when its configuration is
//! invalid or the transport cannot be served; failing tool calls never take
//! the server down.

mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use pyexec_core::{
    ConfigLoader, ContainerBackend, ExecutorConfig, PythonExecutor, PythonExecutorTool,
    ToolRegistry,
};
use rmcp::ServiceExt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::server::ExecutorServer;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Python executor MCP server - runs scripts in disposable containers")]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(long, short, help = "YAML configuration file (defaults to <config dir>/pyexec/pyexec.yaml if present)")]
    config: Option<PathBuf>,

    #[clap(long, help = "Container image reference")]
    image: Option<String>,

    #[clap(long, help = "Container backend: cli or daemon")]
    backend: Option<ContainerBackend>,

    #[clap(long, help = "Per-execution deadline in seconds")]
    timeout_secs: Option<u64>,

    #[clap(long, help = "Maximum number of containers running at once")]
    max_concurrent: Option<usize>,

    #[clap(long, short, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the tool over stdio (default command)
    Serve,
    /// Print the effective configuration as YAML and exit
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // env_logger writes to stderr, keeping stdout for the transport.
    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();

    let config = effective_config(&cli).await?;

    match cli.command {
        Some(Commands::ShowConfig) => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
        Some(Commands::Serve) | None => serve(config).await,
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pyexec").join("pyexec.yaml"))
}

async fn effective_config(cli: &Cli) -> Result<ExecutorConfig> {
    let fallback = default_config_path();
    let mut config = ConfigLoader::resolve(cli.config.as_deref(), fallback.as_deref()).await?;
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut ExecutorConfig, cli: &Cli) {
    if let Some(image) = &cli.image {
        config.image = image.clone();
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(max_concurrent) = cli.max_concurrent {
        config.max_concurrent = max_concurrent;
    }
}

async fn serve(config: ExecutorConfig) -> Result<()> {
    log::info!(
        "Starting {} with image {} ({:?} backend, timeout {}s, {} concurrent)",
        server::SERVER_NAME,
        config.image,
        config.backend,
        config.timeout_secs,
        config.max_concurrent
    );

    let executor = Arc::new(PythonExecutor::new(config)?);
    let mut registry = ToolRegistry::new();
    registry.register_tool(Arc::new(PythonExecutorTool::new(executor)));

    let service = ExecutorServer::new(registry)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| {
            log::error!("Failed to start server: {}", e);
            anyhow::anyhow!("Failed to start server: {}", e)
        })?;

    let reason = service.waiting().await?;
    log::info!("Server stopped: {:?}", reason);
    Ok(())
}
