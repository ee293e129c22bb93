use std::{net::SocketAddr, sync::Arc};

use server_api::ApiContext;
use storage::Storage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::build_router;
use app_state::AppState;
use config::{load_settings, prepare_database_url, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let api = open_api_context(&settings).await;
    let app = build_router(Arc::new(AppState { api }), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Opens the database once. A failure is logged and leaves the store
/// routes failing while the rest of the server keeps serving.
async fn open_api_context(settings: &Settings) -> ApiContext {
    let database_url = match prepare_database_url(&settings.database_url) {
        Ok(url) => url,
        Err(error) => {
            error!(%error, "invalid database url; answer store unavailable");
            return ApiContext::unavailable();
        }
    };

    match Storage::new(&database_url).await {
        Ok(storage) => {
            info!(%database_url, "database connected");
            ApiContext::new(storage)
        }
        Err(error) => {
            error!(
                %database_url,
                %error,
                "failed to open SQLite database; verify parent directory exists and permissions are correct"
            );
            ApiContext::unavailable()
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
