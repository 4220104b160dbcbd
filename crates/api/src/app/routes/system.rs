use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    axum::extract::Extension(session): axum::extract::Extension<SessionContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "session_id": session.session_id().to_string(),
        "opened_at": session.opened_at().to_rfc3339(),
    }))
}
