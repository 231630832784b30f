mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use roombook_api::AppState;
use roombook_db::{DEFAULT_ROOMS, Database};
use roombook_engine::Engine;

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str =
    "roombook=debug,roombook_api=debug,roombook_engine=debug,roombook_db=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;
    if config.seed_rooms {
        db.seed_rooms(DEFAULT_ROOMS)?;
    }

    let engine = Engine::new(Arc::new(db), config.engine.clone());

    let app = roombook_api::router(AppState::new(engine.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr()?;
    info!("roombook listening on {}", addr);
    info!(
        "Scheduling minute: {:?}, retract timers on delete: {}, past start times: {:?}",
        config.engine.minute, config.engine.retract_timers_on_delete, config.engine.past_start
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let dropped = engine.shutdown();
    info!("Shut down ({} pending timers dropped)", dropped);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let Ok(mut sigterm) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            ctrl_c.await.ok();
            info!("Received Ctrl+C, shutting down...");
            return;
        };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
