use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::ProductIdPath;
use crate::{
    error::{AppError, AppResult},
    models::ProductDocument,
    AppState,
};

type JsonReply = AppResult<(StatusCode, Json<Value>)>;

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// Bodies sent without a JSON content type carry no fields, as with Express' `json()` parser.
fn read_body(payload: Result<Json<ProductDocument>, JsonRejection>) -> AppResult<ProductDocument> {
    match payload {
        Ok(Json(document)) => Ok(document),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(ProductDocument::new()),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "Rejected request body");
            Err(AppError::BadRequest("Invalid JSON body".to_string()))
        }
    }
}

// ── List ──────────────────────────────────────────────────────────────────────

/// An empty collection is reported as 404, not as an empty array.
pub async fn list_products(State(state): State<AppState>) -> JsonReply {
    let start = Instant::now();
    let products = state
        .store
        .find_all()
        .await
        .map_err(AppError::store("fetching products"))?;

    info!(
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    if products.is_empty() {
        return Err(AppError::NotFound("No products found".to_string()));
    }

    Ok((StatusCode::OK, Json(Value::Array(products))))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    ProductIdPath(id): ProductIdPath,
) -> JsonReply {
    let start = Instant::now();
    let product = state
        .store
        .find_by_id(id)
        .await
        .map_err(AppError::store("fetching product by ID"))?
        .ok_or_else(not_found)?;

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Fetched product");

    Ok((StatusCode::OK, Json(product)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductDocument>, JsonRejection>,
) -> JsonReply {
    let product = read_body(payload)?;

    let start = Instant::now();
    let result = state
        .store
        .insert_one(product)
        .await
        .map_err(AppError::store("adding product"))?;

    info!(
        id = %result.inserted_id,
        elapsed_ms = start.elapsed().as_millis(),
        "Created product"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product added successfully", "result": result })),
    ))
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Merges the body's fields into the existing document; never creates one.
pub async fn update_product(
    State(state): State<AppState>,
    ProductIdPath(id): ProductIdPath,
    payload: Result<Json<ProductDocument>, JsonRejection>,
) -> JsonReply {
    let fields = read_body(payload)?;

    let start = Instant::now();
    let result = state
        .store
        .update_one(id, fields)
        .await
        .map_err(AppError::store("updating product"))?;

    if result.matched_count == 0 {
        return Err(not_found());
    }

    info!(
        id = %id,
        modified = result.modified_count,
        elapsed_ms = start.elapsed().as_millis(),
        "Updated product"
    );

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Product updated successfully", "result": result })),
    ))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    ProductIdPath(id): ProductIdPath,
) -> JsonReply {
    let start = Instant::now();
    let result = state
        .store
        .delete_one(id)
        .await
        .map_err(AppError::store("deleting product"))?;

    if result.deleted_count == 0 {
        return Err(not_found());
    }

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Deleted product");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Product deleted successfully" })),
    ))
}
