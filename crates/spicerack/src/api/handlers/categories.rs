//! Spice category handlers. Every call is scoped to the caller.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use super::MessageResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::category::{CreateSpiceCategory, SpiceCategory, UpdateSpiceCategory};

pub async fn list_categories(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpiceCategory>>> {
    let categories = state.categories.list(user.id()).await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateSpiceCategory>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SpiceCategory>)> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::bad_request)?;

    let category = state.categories.create(user.id(), request).await?;
    info!(category_id = %category.id, user_id = %user.id(), "Created spice category");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<SpiceCategory>> {
    let category = state.categories.get(user.id(), &id).await?;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSpiceCategory>, JsonRejection>,
) -> ApiResult<Json<SpiceCategory>> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::bad_request)?;

    let category = state.categories.update(user.id(), &id, request).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.categories.delete(user.id(), &id).await?;
    info!(category_id = %id, user_id = %user.id(), "Deleted spice category");
    Ok(Json(MessageResponse::new("Spice category deleted")))
}
