//! Authentication errors.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::token::VerificationError;
use crate::api::ApiError;

/// Failures of the register/login flow and of per-request authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] VerificationError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Validation(String),

    #[error("storage unavailable")]
    StorageUnavailable(#[source] anyhow::Error),

    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
