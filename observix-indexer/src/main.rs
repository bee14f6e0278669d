//! Observix Indexer binary
//!
//! Exit codes: 0 clean shutdown, 1 config error, 2 unrecoverable runtime
//! error.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use observix_indexer::api;
use observix_indexer::config::Settings;
use observix_indexer::profiles::ProfileRegistry;

#[derive(Parser)]
#[command(name = "observix-indexer")]
#[command(about = "Observix normalization service", long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(
        long,
        short = 'c',
        env = "OBSERVIX_INDEXER_CONFIG",
        default_value = "config/indexer.yaml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "observix_indexer=info,tower_http=info".into()),
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

    let registry = match &settings.profiles_dir {
        Some(dir) => match ProfileRegistry::with_dir(dir) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::error!("Failed to load profiles: {:#}", e);
                return ExitCode::from(1);
            }
        },
        None => ProfileRegistry::builtin(),
    };

    tracing::info!("Starting Observix Indexer...");
    tracing::info!("Profiles: {}", registry.names().join(", "));

    if let Err(e) = run(settings, registry).await {
        tracing::error!("Indexer exited with error: {:#}", e);
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}

async fn run(settings: Settings, registry: ProfileRegistry) -> anyhow::Result<()> {
    let app = api::create_router(Arc::new(registry), settings.max_request_bytes);

    let addr = settings.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Indexer stopped");
    Ok(())
}
