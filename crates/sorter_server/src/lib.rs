//! HTTP and websocket surface of the waste-sorter backend.
//!
//! # Responsibility
//! - Map REST routes onto `sorter_core` services and the control plane.
//! - Push fanout messages to dashboard websocket sessions.
//!
//! # Invariants
//! - Handlers never block the executor on SQLite; see [`state::AppState::with_conn`].
//! - The bin table is reconciled once before the listener accepts requests.

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use log::{error, info};
use sorter_core::RepoError;
use std::time::Duration;
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod realtime;
pub mod response;
pub mod routes;
pub mod state;

use config::{ConfigError, ServerConfig};
use error::AppError;
use state::AppState;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database bootstrap failed: {0}")]
    Database(#[from] RepoError),

    #[error("startup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the full router over `state`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/api", routes::api_router())
        .route("/ws", get(realtime::ws_handler))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Prepares the database, binds and serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.log_summary();
    info!("event=server_start module=server status=start");
    let address = config.bind_address();
    let state = AppState::new(config);

    let bootstrap = state.clone();
    tokio::task::spawn_blocking(move || bootstrap.prepare_database())
        .await??;

    let app = build_router(state);
    let listener = TcpListener::bind(&address).await?;
    info!("event=server_start module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=shutdown module=server status=start signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=server status=start signal=sigterm");
            }
            Err(err) => {
                error!(
                    "event=signal_install module=server status=error signal=sigterm error={err}"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
