use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::app::{dto, errors};
use crate::context::{SessionContext, SessionStore};

pub async fn open_session(
    State(sessions): State<Arc<SessionStore>>,
    Json(body): Json<dto::OpenSessionRequest>,
) -> axum::response::Response {
    match sessions.open(&body.password, Utc::now()) {
        Some(ctx) => {
            tracing::info!(session = %ctx.session_id(), "session opened");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "token": ctx.session_id().to_string() })),
            )
                .into_response()
        }
        None => {
            tracing::warn!("rejected session request with wrong password");
            errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "wrong password")
        }
    }
}

pub async fn close_session(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Extension(session): Extension<SessionContext>,
) -> StatusCode {
    sessions.close(session.session_id());
    tracing::info!(session = %session.session_id(), "session closed");
    StatusCode::NO_CONTENT
}
