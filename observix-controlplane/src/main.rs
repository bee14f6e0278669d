//! Observix Control Plane binary
//!
//! Loads YAML config, opens the embedded store, and serves the catalog API.
//! Exit codes: 0 clean shutdown, 1 config error, 2 unrecoverable runtime
//! error (store or bind failure).

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use observix_controlplane::api::{self, AppState};
use observix_controlplane::config::Settings;
use observix_controlplane::db;
use observix_controlplane::service::agent as agent_service;

#[derive(Parser)]
#[command(name = "observix-controlplane")]
#[command(about = "Observix control plane", long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(
        long,
        short = 'c',
        env = "OBSERVIX_CP_CONFIG",
        default_value = "config/control_plane.yaml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "observix_controlplane=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = match Settings::load(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return ExitCode::from(1);
        }
    };

    tracing::info!("Starting Observix Control Plane...");

    if let Err(e) = run(settings).await {
        tracing::error!("Control plane exited with error: {:#}", e);
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!("Connecting to store: {}", settings.database_url);

    let pool = db::create_pool(&settings.database_url).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(pool.clone(), settings.agent_offline_threshold_seconds);
    let app = api::create_router(state, &settings.allow_origins);

    let cancel = CancellationToken::new();
    let sweep = tokio::spawn(agent_service::liveness_sweep(
        pool,
        settings.agent_offline_threshold_seconds,
        cancel.child_token(),
    ));

    let addr = settings.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    let _ = sweep.await;

    tracing::info!("Control plane stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
