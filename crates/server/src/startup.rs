use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::auth::{CredentialVerifier, JwtVerifier};
use service::storage::Storage;

use crate::auth::AppState;
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) when readable, otherwise environment only.
fn load_config() -> anyhow::Result<(AppConfig, Option<String>)> {
    match configs::load_default() {
        Ok(mut cfg) => {
            cfg.normalize_and_validate()?;
            Ok((cfg, None))
        }
        Err(e) => Ok((AppConfig::from_env()?, Some(e.to_string()))),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl_c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: open storage, build the app and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let (cfg, file_error) = load_config()?;
    common::utils::logging::init_logging(&cfg.logging.format);
    if let Some(err) = file_error {
        info!(reason = %err, "config file not loaded, using environment");
    }

    let storage = Storage::open(&cfg.database).await?;
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(JwtVerifier::new(&cfg.auth.jwt_secret));
    let state = AppState::new(storage.clone(), verifier);
    let app: Router = routes::build_router(state, build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting catalog api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    storage.close().await?;
    info!("catalog api stopped");
    Ok(())
}
