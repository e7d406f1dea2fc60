use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::storage::{self, Storage};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_from_env();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router over an already opened store, configured from `cfg.server`.
pub fn app(storage: Arc<dyn Storage>, cfg: &configs::ServerConfig) -> Router {
    routes::build_router(AppState::new(storage), build_cors(), cfg.max_concurrent_requests)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: open the configured store, serve the API until Ctrl+C, then close the store.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let storage = storage::open(&cfg).await.map_err(StartupError::from)?;
    let app = app(Arc::clone(&storage), &cfg.server);

    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(StartupError::from)?;
    let addr = listener.local_addr()?;
    info!(%addr, backend = ?cfg.storage.backend, "hbnb api listening");

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;
    // close even when serving failed
    storage.close().await?;
    info!("storage closed");
    served?;
    Ok(())
}
