use clap::Parser;
use portal_server::cli::Cli;
use portal_server::{telemetry, App, AppState, Config};
use portal_storage::open_storage;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    let config = Config::load(&cli)?;
    if !config.ttl.is_positive() {
        info!("ttl is not positive, urls are stored forever");
    }

    // Opening redb may wait on a file lock; keep that off the async workers.
    let storage_config = config.storage.clone();
    let storage = tokio::task::spawn_blocking(move || open_storage(&storage_config)).await??;
    let state = AppState::new(storage, config.ttl, config.host_name.clone());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(listen_addr = %listener.local_addr()?, "starting portal server");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("portal server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
