use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use tokio::net::TcpListener;
use tracing::{error, info};

use dtm_kit_server::{app, AppState, Args};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let addr = args.addr;
    let working_dir = env::current_dir().context("Failed to read working directory")?;
    let config = args.into_config(&working_dir);

    info!("DTM: {:?}", config.dtm_path);
    info!("Static files: {:?}", config.static_dir);

    let state = AppState::new(config);

    // serve right away; /dtm_info answers 503 until this finishes
    let preparing = state.clone();
    tokio::spawn(async move { preparing.prepare_in_background().await });

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
