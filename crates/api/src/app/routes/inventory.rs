use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_inventory::{summarize, ProductRecord};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/products", post(register_product).get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id/adjust", post(adjust_stock))
        .route("/images", post(upload_image))
        .route("/export", get(export_products))
        .route("/reload", post(reload_ledger))
}

pub async fn list_products(
    Extension(services): Extension<AppServices>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let result = services
        .ledger(move |ledger| {
            Ok(ledger
                .search(&query.q)
                .into_iter()
                .cloned()
                .collect::<Vec<ProductRecord>>())
        })
        .await;

    let items = match result {
        Ok(items) => items,
        Err(e) => return errors::service_error_to_response(e),
    };
    match summarize(&items) {
        Ok(summary) => {
            (StatusCode::OK, Json(dto::ProductListResponse { items, summary })).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<AppServices>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = services
        .ledger(move |ledger| Ok(ledger.find_by_identifier(&id)?.clone()))
        .await;

    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn register_product(
    Extension(services): Extension<AppServices>,
    Json(body): Json<dto::RegisterProductRequest>,
) -> axum::response::Response {
    let new = match body.into_new_product() {
        Ok(new) => new,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let result = services
        .ledger(move |ledger| Ok(ledger.register(new)?.clone()))
        .await;

    match result {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn adjust_stock(
    Extension(services): Extension<AppServices>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    let result = services
        .ledger(move |ledger| {
            let stock = ledger.adjust_stock(&id, body.delta)?;
            Ok(dto::AdjustStockResponse {
                id: id.trim().to_string(),
                stock,
            })
        })
        .await;

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Store raw image bytes; the returned reference goes into a later registration.
pub async fn upload_image(
    Extension(services): Extension<AppServices>,
    Query(query): Query<dto::ImageQuery>,
    body: Bytes,
) -> axum::response::Response {
    if body.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_image", "empty image body");
    }

    match services.store_image(query.name, body.to_vec()).await {
        Ok(image) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "image": image.as_str() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Current (optionally filtered) table as a JSON array, for download.
pub async fn export_products(
    Extension(services): Extension<AppServices>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let result = services
        .ledger(move |ledger| {
            Ok(ledger
                .search(&query.q)
                .into_iter()
                .cloned()
                .collect::<Vec<ProductRecord>>())
        })
        .await;

    match result {
        Ok(items) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventario.json\"",
            )],
            Json(items),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Re-read the backend, picking up rows written by other processes.
pub async fn reload_ledger(Extension(services): Extension<AppServices>) -> axum::response::Response {
    let result = services
        .ledger(|ledger| {
            ledger.reload()?;
            Ok(ledger.len())
        })
        .await;

    match result {
        Ok(records) => (StatusCode::OK, Json(serde_json::json!({ "records": records }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
