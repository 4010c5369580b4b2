use std::net::SocketAddr;

use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use judging_server::config::AppConfig;
use judging_server::database::init_db;
use judging_server::state::AppState;
use judging_server::{build_router, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;
    seed::ensure_bootstrap_admin(&db, config.auth.bootstrap_admin.as_deref()).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(db, config);

    let cache_sweeper = state
        .access_cache
        .spawn_sweeper(state.config.cache.sweep_interval());
    let limiter_sweeper = state
        .rate_limiter
        .spawn_sweeper(state.config.rate_limit.sweep_interval());

    let app = build_router(state);

    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);
    info!("Scalar at http://{}/scalar", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cache_sweeper.abort();
    limiter_sweeper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
