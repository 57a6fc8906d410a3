//! Identity-context middleware and the `CurrentUser` extractor.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::error::AuthError;
use super::token::{TokenVerifier, VerificationError};
use crate::user::UserId;

/// State consumed by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthState {
    verifier: Arc<TokenVerifier>,
}

impl AuthState {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Resolve the caller's identity from request headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<CurrentUser, AuthError> {
        let token = extract_bearer(headers)?;
        let user_id = self.verifier.verify(token)?;
        Ok(CurrentUser { user_id })
    }
}

/// The authenticated caller of the current request.
///
/// Inserted into request extensions by [`auth_middleware`]; lives exactly as
/// long as the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: UserId,
}

impl CurrentUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn id(&self) -> &UserId {
        &self.user_id
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Routes outside the protected group never carry an identity.
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingCredential)
    }
}

/// Authenticate the request or short-circuit it with a 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = state.authenticate(req.headers()).inspect_err(|e| {
        debug!(
            method = %req.method(),
            path = %req.uri().path(),
            reason = %e,
            "Rejected unauthenticated request"
        );
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// No header at all is a missing credential; a header that is present but
/// not a usable bearer credential is a malformed token.
fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    let malformed = || AuthError::InvalidToken(VerificationError::Malformed);

    let value = header.to_str().map_err(|_| malformed())?;
    let (scheme, token) = value.trim().split_once(' ').ok_or_else(malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(malformed());
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(malformed());
    }

    Ok(token)
}
