//! Credential storage.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, instrument};

use super::models::{NewUser, User, UserId};

/// Why a user could not be inserted.
#[derive(Debug, Error)]
pub enum InsertUserError {
    #[error("email is already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Persistence for user identities and password hashes.
///
/// Pure lookup/insert; no validation or hashing happens here.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;

    /// Insert a user, assigning a fresh ID.
    async fn insert(&self, user: NewUser) -> Result<User, InsertUserError>;
}

/// SQLite-backed [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = ? COLLATE NOCASE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(user)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<User, InsertUserError> {
        let id = UserId::generate();
        debug!("Creating user: {} ({})", user.email, id);

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(InsertUserError::DuplicateEmail),
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to insert user").into()),
        }

        let created = self
            .find_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))?;

        Ok(created)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn repo() -> UserRepository {
        let db = Database::in_memory().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hashed_password".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let repo = repo().await;

        let user = repo.insert(new_user("test@example.com")).await.unwrap();
        assert!(user.id.as_str().starts_with("usr_"));
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.password_hash, "hashed_password");

        let by_id = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.id, user.id);

        let by_email = repo.find_by_email("test@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let repo = repo().await;
        let user = repo.insert(new_user("Mixed@Example.com")).await.unwrap();

        let found = repo.find_by_email("mixed@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_constraint() {
        let repo = repo().await;
        repo.insert(new_user("dup@example.com")).await.unwrap();

        let err = repo.insert(new_user("DUP@example.com")).await.unwrap_err();
        assert!(matches!(err, InsertUserError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let repo = repo().await;
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(
            repo.find_by_id(&UserId::from("usr_missing".to_string()))
                .await
                .unwrap()
                .is_none()
        );
    }
}
