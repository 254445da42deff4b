#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::path::Path;

use args::Args;
use atelier_config::Config;
use atelier_server::Server;
use clap::Parser;
use tokio_util::sync::CancellationToken;

/// Configuration file read when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "atelier.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::load_or_default(config_path)?,
    };

    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    atelier_telemetry::init(&config.telemetry, "info")?;

    tracing::info!(
        config_path = %config_path.display(),
        runway_configured = config.runway.credential().is_some(),
        "starting atelier"
    );

    let server = Server::new(&config)?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("atelier stopped");
    Ok(())
}

/// Wait for `SIGINT` or `SIGTERM`
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
