//! Authentication configuration.

use serde::{Deserialize, Serialize};

use super::password::default_bcrypt_cost;

/// Placeholder secret that must never reach production.
const INSECURE_PLACEHOLDER_SECRET: &str = "change-me-in-production";

/// Minimum accepted secret length in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: one year.
const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Cost range accepted by bcrypt.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT secret for HS256. Either a literal or `env:VAR_NAME`.
    pub jwt_secret: Option<String>,

    /// Lifetime of issued tokens, in seconds.
    pub token_ttl_secs: u64,

    /// bcrypt cost factor for password hashing.
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No default JWT secret - must be explicitly configured
            jwt_secret: None,
            token_ttl_secs: 24 * 60 * 60,
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration and return the resolved signing secret.
    pub fn validated_secret(&self) -> Result<String, ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret == INSECURE_PLACEHOLDER_SECRET {
            return Err(ConfigValidationError::InsecureJwtSecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigValidationError::ZeroTokenTtl);
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigValidationError::TokenTtlTooLarge(self.token_ttl_secs));
        }
        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(ConfigValidationError::InvalidBcryptCost(self.bcrypt_cost));
        }

        Ok(secret)
    }

    /// Token lifetime as a chrono duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        // Clamped to the validated bound.
        let secs = self.token_ttl_secs.min(MAX_TOKEN_TTL_SECS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(0))
    }

    /// Generate a secure random JWT secret using cryptographically secure RNG.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("JWT secret is required. Set SPICERACK_AUTH__JWT_SECRET or auth.jwt_secret in config.")]
    MissingJwtSecret,

    #[error("JWT secret cannot be the placeholder value. Please configure a secure secret.")]
    InsecureJwtSecret,

    #[error("JWT secret must be at least 32 characters long.")]
    JwtSecretTooShort,

    #[error("auth.token_ttl_secs must be greater than zero.")]
    ZeroTokenTtl,

    #[error("auth.token_ttl_secs must be at most one year, got {0}.")]
    TokenTtlTooLarge(u64),

    #[error("auth.bcrypt_cost must be between 4 and 31, got {0}.")]
    InvalidBcryptCost(u32),

    #[error("Environment variable '{0}' not found (referenced via env:{0} in config).")]
    EnvVarNotFound(String),

    #[error("Environment variable '{0}' is empty (referenced via env:{0} in config).")]
    EnvVarEmpty(String),
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)]
mod tests {
    use super::*;

    const GOOD_SECRET: &str = "a-perfectly-fine-secret-of-32-plus-chars";

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        // No default JWT secret for security
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.token_ttl_secs, 86_400);
        assert_eq!(config.token_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_validation_no_secret() {
        let config = AuthConfig::default();
        assert_eq!(
            config.validated_secret(),
            Err(ConfigValidationError::MissingJwtSecret)
        );
    }

    #[test]
    fn test_validation_insecure_secret() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some(INSECURE_PLACEHOLDER_SECRET.to_string());
        assert_eq!(
            config.validated_secret(),
            Err(ConfigValidationError::InsecureJwtSecret)
        );
    }

    #[test]
    fn test_validation_short_secret() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some("short".to_string());
        assert_eq!(
            config.validated_secret(),
            Err(ConfigValidationError::JwtSecretTooShort)
        );
    }

    #[test]
    fn test_validation_zero_ttl() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some(GOOD_SECRET.to_string());
        config.token_ttl_secs = 0;
        assert_eq!(
            config.validated_secret(),
            Err(ConfigValidationError::ZeroTokenTtl)
        );
    }

    #[test]
    fn test_validation_oversized_ttl() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some(GOOD_SECRET.to_string());
        config.token_ttl_secs = u64::MAX;
        assert_eq!(
            config.validated_secret(),
            Err(ConfigValidationError::TokenTtlTooLarge(u64::MAX))
        );
        // Never panics, even when called without validating first.
        assert_eq!(config.token_ttl(), chrono::Duration::days(365));

        config.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validated_secret().is_ok());
    }

    #[test]
    fn test_validation_bad_cost() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some(GOOD_SECRET.to_string());
        config.bcrypt_cost = 2;
        assert_eq!(
            config.validated_secret(),
            Err(ConfigValidationError::InvalidBcryptCost(2))
        );
    }

    #[test]
    fn test_validation_valid() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some(GOOD_SECRET.to_string());
        assert_eq!(config.validated_secret().unwrap(), GOOD_SECRET);
    }

    #[test]
    fn test_generate_jwt_secret_length_and_charset() {
        let secret = AuthConfig::generate_jwt_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_secret_passes_validation() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some(AuthConfig::generate_jwt_secret());
        assert!(config.validated_secret().is_ok());
        assert_ne!(
            AuthConfig::generate_jwt_secret(),
            AuthConfig::generate_jwt_secret()
        );
    }

    #[test]
    fn test_resolve_jwt_secret_literal() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some("my-literal-secret".to_string());

        let resolved = config.resolve_jwt_secret().unwrap();
        assert_eq!(resolved, Some("my-literal-secret".to_string()));
    }

    #[test]
    fn test_resolve_jwt_secret_env_var() {
        // SAFETY: This is a test-only environment variable with a unique name
        unsafe {
            std::env::set_var(
                "SPICERACK_TEST_JWT_SECRET_4821",
                "secret-from-env-var-at-least-32-chars",
            );
        }

        let mut config = AuthConfig::default();
        config.jwt_secret = Some("env:SPICERACK_TEST_JWT_SECRET_4821".to_string());

        let resolved = config.resolve_jwt_secret().unwrap();
        assert_eq!(
            resolved,
            Some("secret-from-env-var-at-least-32-chars".to_string())
        );

        // SAFETY: Cleaning up test environment variable
        unsafe {
            std::env::remove_var("SPICERACK_TEST_JWT_SECRET_4821");
        }
    }

    #[test]
    fn test_resolve_jwt_secret_env_var_not_found() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some("env:SPICERACK_NONEXISTENT_VAR_4821".to_string());

        assert_eq!(
            config.resolve_jwt_secret().unwrap_err(),
            ConfigValidationError::EnvVarNotFound("SPICERACK_NONEXISTENT_VAR_4821".to_string())
        );
    }

    #[test]
    fn test_resolve_jwt_secret_env_var_empty() {
        // SAFETY: This is a test-only environment variable with a unique name
        unsafe {
            std::env::set_var("SPICERACK_TEST_EMPTY_SECRET_4821", "");
        }

        let mut config = AuthConfig::default();
        config.jwt_secret = Some("env:SPICERACK_TEST_EMPTY_SECRET_4821".to_string());

        assert_eq!(
            config.resolve_jwt_secret().unwrap_err(),
            ConfigValidationError::EnvVarEmpty("SPICERACK_TEST_EMPTY_SECRET_4821".to_string())
        );

        // SAFETY: Cleaning up test environment variable
        unsafe {
            std::env::remove_var("SPICERACK_TEST_EMPTY_SECRET_4821");
        }
    }
}
