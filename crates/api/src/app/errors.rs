use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_inventory::{ImageError, LedgerError, StoreError};

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Ledger(e) => ledger_error_to_response(e),
        ServiceError::Poisoned | ServiceError::Join(_) => {
            tracing::error!(error = %err, "ledger service failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string())
        }
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        LedgerError::Domain(e) => domain_error_to_response(e),
        LedgerError::Store(StoreError::Unavailable(_)) => {
            tracing::error!(error = %message, "stock backend unavailable");
            json_error(StatusCode::BAD_GATEWAY, "store_unavailable", message)
        }
        LedgerError::Store(_) => {
            tracing::error!(error = %message, "stock backend error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
        LedgerError::Image(ImageError::InvalidName(_)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_image", message)
        }
        LedgerError::Image(ImageError::Unavailable(_)) => {
            tracing::error!(error = %message, "image store unavailable");
            json_error(StatusCode::BAD_GATEWAY, "image_store_unavailable", message)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::InvalidInput(_) => json_error(StatusCode::BAD_REQUEST, "invalid_input", message),
        DomainError::DuplicateIdentifier(_) => {
            json_error(StatusCode::CONFLICT, "duplicate_identifier", message)
        }
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
