//! Observix Agent binary
//!
//! Exit codes: 0 clean shutdown, 1 config error, 2 unrecoverable runtime
//! error.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use observix_agent::AgentRuntime;
use observix_agent::config::AgentConfig;

#[derive(Parser)]
#[command(name = "observix-agent")]
#[command(about = "Observix edge agent", long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(
        long,
        short = 'c',
        env = "OBSERVIX_AGENT_CONFIG",
        default_value = "config/agent.yaml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "observix_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match AgentConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return ExitCode::from(1);
        }
    };

    tracing::info!(
        "Starting Observix Agent: agent_id={} region={} control_plane={}",
        config.agent_id,
        config.region,
        config.control_plane.url
    );

    let runtime = Arc::new(AgentRuntime::new(config));

    // Ctrl-C initiates graceful shutdown; the runtime returns once every
    // pipeline has stopped or been abandoned past its deadline.
    let shutdown = runtime.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.stop();
        }
    });

    runtime.start().await;

    tracing::info!("Agent stopped");
    ExitCode::SUCCESS
}
