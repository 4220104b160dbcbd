//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared ledger and image store
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use stockroom_infra::AppConfig;

use crate::context::SessionStore;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Upper bound on request bodies; product photos are the largest payload.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Open the configured backend and build the full HTTP router.
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let password = config.password.clone();
    // The SQLite backend drives its own runtime, so it must be opened off the async workers.
    let services = tokio::task::spawn_blocking(move || AppServices::open(&config)).await??;
    Ok(build_app_with(services, password))
}

/// Build the router around already-open services.
pub fn build_app_with(services: AppServices, password: impl Into<String>) -> Router {
    let sessions = Arc::new(SessionStore::new(password));
    let auth_state = middleware::AuthState {
        sessions: sessions.clone(),
    };

    // Protected routes: require an open session.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(Extension(sessions.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::session_middleware,
        ));

    let public = Router::new()
        .route("/session", post(routes::session::open_session))
        .with_state(sessions);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}
