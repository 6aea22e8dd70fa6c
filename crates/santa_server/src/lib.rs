//! HTTP surface of the Secret Santa exchange backend.
//!
//! # Routes
//! - `GET /` service banner
//! - `POST /auth/register`, `POST /auth/login`
//! - `GET|POST /events`, `GET /events/:event_id`
//! - `POST /events/:event_id/participants`
//! - `POST /events/:event_id/draw`
//! - `GET /events/:event_id/my-assignment?participant_email=...`
//!
//! Organizer routes require `Authorization: Bearer <token>`. The
//! assignment lookup is public: event id plus participant email is enough.

use axum::{
    routing::{get, post},
    Router,
};
use log::{error, info};
use santa_core::LogSink;
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use config::{Config, ConfigError};
use routes::{
    add_participant_handler, create_event_handler, draw_handler, get_event_handler,
    list_events_handler, login_handler, my_assignment_handler, register_handler, root_handler,
};
use state::{SharedState, State};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] santa_core::LoggingError),

    #[error("database setup failed: {0}")]
    Database(#[from] santa_core::db::DbError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the application router over shared state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/events", get(list_events_handler).post(create_event_handler))
        .route("/events/:event_id", get(get_event_handler))
        .route(
            "/events/:event_id/participants",
            post(add_participant_handler),
        )
        .route("/events/:event_id/draw", post(draw_handler))
        .route("/events/:event_id/my-assignment", get(my_assignment_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Loads configuration, opens storage and serves until a shutdown signal.
pub async fn start_server() -> Result<(), ServerError> {
    let config = Config::load()?;
    let sink = LogSink::from_dir(config.log_dir.as_deref())?;
    santa_core::init_logging(&config.log_level, sink)?;
    config.log_notices();

    info!("Initializing state...");
    let address = config.address();
    let state = State::open(config)?;
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("Failed to install signal handler: {err}");
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
