//! Password hashing.

use anyhow::{Context, Result};

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Default bcrypt cost: cheap in debug builds, stronger in release.
pub fn default_bcrypt_cost() -> u32 {
    if cfg!(debug_assertions) { 4 } else { 10 }
}

/// One-way password hasher backed by bcrypt.
///
/// Every digest embeds its own random salt, so hashing the same password
/// twice yields two different strings that both verify. Passwords longer
/// than [`MAX_PASSWORD_BYTES`] are refused rather than silently truncated.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Digest of a throwaway password, used to spend equal work on logins
    /// for unknown emails.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (4..=31).
    pub fn new(cost: u32) -> Result<Self> {
        let dummy_hash = bcrypt::hash("spicerack-dummy-password", cost)
            .with_context(|| format!("invalid bcrypt cost: {cost}"))?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a plaintext password.
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::non_truncating_hash(password, self.cost).context("Failed to hash password")
    }

    /// Verify a plaintext password against a digest.
    ///
    /// A malformed digest or an over-long password never errors; it simply
    /// does not match.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        bcrypt::non_truncating_verify(password, digest).unwrap_or(false)
    }

    /// Burn one verification against the dummy digest.
    pub fn verify_dummy(&self, password: &str) {
        std::hint::black_box(self.verify(password, &self.dummy_hash));
    }

    /// Configured bcrypt cost.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}
