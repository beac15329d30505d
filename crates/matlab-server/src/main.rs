//! MCP server entry point for MATLAB script generation and execution.
//!
//! # Usage
//!
//! Run the server via stdio transport, optionally passing the number of
//! seconds MATLAB stays open after a saved script finishes:
//!
//! ```bash
//! matlab-mcp 5
//! ```
//!
//! Or configure in your MCP client:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "matlab": {
//!       "command": "matlab-mcp",
//!       "env": { "MATLAB_PATH": "/usr/local/bin/matlab" }
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use clap::Parser;
use matlab_mcp_core::{DEFAULT_PAUSE_SECS, EngineConfig, MatlabEngine};
use matlab_mcp_server::service::MatlabService;
use rmcp::service::{QuitReason, RunningService};
use rmcp::transport::stdio;
use rmcp::{RoleServer, ServiceExt};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// MCP server that saves and runs MATLAB scripts.
///
/// The MATLAB executable is taken from `MATLAB_PATH` and the scratch
/// directory from `MATLAB_TEMP_DIR`.
#[derive(Debug, Parser)]
#[command(name = "matlab-mcp", version, about, long_about = None)]
struct Cli {
    /// Seconds MATLAB stays open after a saved script finishes
    #[arg(default_value_t = DEFAULT_PAUSE_SECS)]
    pause_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for MCP protocol)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,matlab_mcp_server=debug,matlab_mcp_core=debug")
        }))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    tracing::info!("Starting matlab-mcp v{}", env!("CARGO_PKG_VERSION"));

    let config = EngineConfig::from_env(cli.pause_secs);
    tracing::info!(
        executable = %config.executable_path.display(),
        temp_dir = %config.temp_dir.display(),
        pause_secs = config.pause_secs,
        "MATLAB configuration"
    );
    let engine = MatlabEngine::new(config)?;

    let service = MatlabService::new(engine).serve(stdio()).await?;
    let reason = serve_until_interrupted(service, tokio::signal::ctrl_c()).await?;

    tracing::info!(?reason, "Server shutdown complete");
    Ok(())
}

/// Waits for the service to finish, cancelling it when `interrupt` fires.
///
/// Cancelling closes the transport, so `waiting` returns normally and the
/// process exits with status 0.
async fn serve_until_interrupted<I>(
    service: RunningService<RoleServer, MatlabService>,
    interrupt: I,
) -> Result<QuitReason>
where
    I: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        match interrupt.await {
            Ok(()) => {
                tracing::info!("Interrupted, shutting down");
                cancel.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "Failed to listen for interrupt"),
        }
    });

    Ok(service.waiting().await?)
}
