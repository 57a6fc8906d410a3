//! Registration and login.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, instrument};

use super::models::{Credentials, LoginResponse, NewUser, User, UserId};
use super::repository::{CredentialStore, InsertUserError};
use crate::auth::{AuthError, MAX_PASSWORD_BYTES, PasswordHasher, TokenIssuer, VerificationError};

/// Minimum accepted password length on registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Composes the credential store, password hasher and token issuer.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    issuer: Arc<TokenIssuer>,
}

impl UserService {
    /// Create a new user service.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        Self {
            store,
            hasher: Arc::new(hasher),
            issuer: Arc::new(issuer),
        }
    }

    /// Register a new user. No token is issued; the client logs in afterwards.
    #[instrument(skip(self, credentials))]
    pub async fn register(&self, credentials: Credentials) -> Result<User, AuthError> {
        let email = normalize_email(&credentials.email);
        validate_email(&email)?;
        if credentials.password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if credentials.password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::Validation(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        if self
            .store
            .find_by_email(&email)
            .await
            .map_err(AuthError::StorageUnavailable)?
            .is_some()
        {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(credentials.password).await?;

        // The unique index still decides when two registrations race past the
        // check above.
        let user = self
            .store
            .insert(NewUser {
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                InsertUserError::DuplicateEmail => AuthError::DuplicateEmail,
                InsertUserError::Storage(e) => AuthError::StorageUnavailable(e),
            })?;

        info!(user_id = %user.id, email = %user.email, "Registered new user");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: Credentials) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(&credentials.email);
        validate_email(&email)?;
        if credentials.password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }

        let user = self
            .store
            .find_by_email(&email)
            .await
            .map_err(AuthError::StorageUnavailable)?;

        let Some(user) = user else {
            self.burn_dummy_verify(credentials.password).await?;
            debug!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .verify_password(credentials.password, user.password_hash.clone())
            .await?;
        if !matches {
            debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(&user.id).map_err(AuthError::Internal)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            token,
            email: user.email,
        })
    }

    /// Look up the user behind an authenticated request.
    #[instrument(skip(self))]
    pub async fn current_user(&self, id: &UserId) -> Result<User, AuthError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(AuthError::StorageUnavailable)?
            .ok_or_else(|| {
                debug!(user_id = %id, "Token subject no longer exists");
                AuthError::InvalidToken(VerificationError::Malformed)
            })
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("Password hashing task failed")
            .and_then(|r| r)
            .map_err(AuthError::Internal)
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .context("Password verification task failed")
            .map_err(AuthError::Internal)
    }

    async fn burn_dummy_verify(&self, password: String) -> Result<(), AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .context("Password verification task failed")
            .map_err(AuthError::Internal)
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("hasher", &self.hasher)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Trim and lowercase an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("email is required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(AuthError::Validation("invalid email format".to_string()));
    }
    Ok(())
}

/// Basic email shape: `local@domain.tld`, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
