//! Authentication module.
//!
//! Provides:
//! - bcrypt password hashing
//! - HS256 session token issuing and verification
//! - the middleware that binds a verified identity to each protected request

mod claims;
mod config;
mod error;
mod middleware;
mod password;
mod token;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigValidationError};
pub use error::AuthError;
pub use middleware::{AuthState, CurrentUser, auth_middleware};
pub use password::{MAX_PASSWORD_BYTES, PasswordHasher, default_bcrypt_cost};
pub use token::{TokenIssuer, TokenVerifier, VerificationError};
