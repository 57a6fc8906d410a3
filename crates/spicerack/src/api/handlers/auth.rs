//! Register, login and identity handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::user::{Credentials, LoginResponse, UserInfo};

/// Register a new account. Returns the created user; no token.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let Json(credentials) = payload?;
    let user = state.users.register(credentials).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange credentials for a session token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(credentials) = payload?;
    let response = state.users.login(credentials).await?;
    Ok(Json(response))
}

/// The authenticated caller.
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<UserInfo>> {
    let user = state.users.current_user(user.id()).await?;
    Ok(Json(user.into()))
}
