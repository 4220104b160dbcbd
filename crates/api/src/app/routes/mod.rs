use axum::{routing::{delete, get}, Router};

pub mod inventory;
pub mod session;
pub mod system;

/// Router for all endpoints that require an open session.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/session", delete(session::close_session))
        .nest("/inventory", inventory::router())
}
