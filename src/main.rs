use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use roast_my_fridge::{backend::BackendClient, build_router, config::ProxyConfig, routes::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = ProxyConfig::from_env();
    let backend = BackendClient::new(&config)?;
    tracing::info!(
        backend = backend.endpoint(),
        timeout = ?config.backend_timeout,
        "Relaying generation requests"
    );

    let app = build_router(AppState { backend: Arc::new(backend) });

    let addr = config.bind_addr();
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
