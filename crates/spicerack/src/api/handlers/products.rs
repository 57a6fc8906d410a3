//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use super::MessageResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::product::{CreateProduct, Product, UpdateProduct};

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.products.list().await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProduct>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::bad_request)?;

    let product = state.products.create(request).await?;
    info!(product_id = %product.id, "Created product");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .products
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("product"))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProduct>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::bad_request)?;

    state
        .products
        .update(&id, request)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("product"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.products.delete(&id).await? {
        return Err(ApiError::not_found("product"));
    }
    info!(product_id = %id, "Deleted product");
    Ok(Json(MessageResponse::new("Product deleted")))
}
