//! RTO Status Dashboard Server binary.

use std::net::SocketAddr;

use rto_server::{
    config::Config, create_app, create_state, init_tracing, services::bootstrap::ensure_admin,
};
use rto_store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    tracing::info!(
        database = %config.database_path.display(),
        uploader = %config.uploader_email,
        "Starting RTO Status Dashboard Server"
    );

    if config.uses_development_secret() {
        tracing::warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    // Open the JSON store
    let store = JsonFileStore::open(&config.database_path).await?;

    // Create application state
    let state = create_state(config.clone(), store);

    // Make sure someone can log in
    ensure_admin(&state).await?;

    // Create application router
    let app = create_app(state);

    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(addr = %addr, "Server listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
