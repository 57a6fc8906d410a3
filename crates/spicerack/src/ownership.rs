//! Owner-scoped access to tenant data.
//!
//! Every read and write of an owned record is keyed by `(owner, id)` in a
//! single storage call. A record that belongs to someone else looks exactly
//! like one that does not exist.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::user::UserId;

/// Storage contract for records that belong to a user.
///
/// Implementations must apply the owner filter inside the same statement that
/// touches the record, never as a separate fetch-then-check.
#[async_trait]
pub trait OwnedStore: Send + Sync {
    type Record: Send;
    type Create: Send;
    type Update: Send;

    /// Resource name used in logs.
    const KIND: &'static str;

    async fn list_owned(&self, owner: &UserId) -> Result<Vec<Self::Record>>;

    /// Insert a record stamped with `owner`.
    async fn insert_owned(&self, owner: &UserId, payload: Self::Create) -> Result<Self::Record>;

    async fn get_owned(&self, owner: &UserId, id: &str) -> Result<Option<Self::Record>>;

    /// Apply the fields present in `payload`. `None` on a miss.
    async fn update_owned(
        &self,
        owner: &UserId,
        id: &str,
        payload: Self::Update,
    ) -> Result<Option<Self::Record>>;

    /// `false` on a miss.
    async fn delete_owned(&self, owner: &UserId, id: &str) -> Result<bool>;
}

/// Outcome of a scoped access that did not produce a record.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("not found")]
    NotFound,

    #[error("storage unavailable")]
    StorageUnavailable(#[source] anyhow::Error),
}

/// Gate in front of an [`OwnedStore`].
#[derive(Debug, Clone)]
pub struct OwnershipGate<S> {
    store: S,
}

impl<S: OwnedStore> OwnershipGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(kind = S::KIND))]
    pub async fn list(&self, owner: &UserId) -> Result<Vec<S::Record>, ScopeError> {
        self.store.list_owned(owner).await.map_err(storage)
    }

    #[instrument(skip(self, payload), fields(kind = S::KIND))]
    pub async fn create(&self, owner: &UserId, payload: S::Create) -> Result<S::Record, ScopeError> {
        self.store
            .insert_owned(owner, payload)
            .await
            .map_err(storage)
    }

    #[instrument(skip(self), fields(kind = S::KIND))]
    pub async fn get(&self, owner: &UserId, id: &str) -> Result<S::Record, ScopeError> {
        self.store
            .get_owned(owner, id)
            .await
            .map_err(storage)?
            .ok_or_else(|| miss(id))
    }

    #[instrument(skip(self, payload), fields(kind = S::KIND))]
    pub async fn update(
        &self,
        owner: &UserId,
        id: &str,
        payload: S::Update,
    ) -> Result<S::Record, ScopeError> {
        self.store
            .update_owned(owner, id, payload)
            .await
            .map_err(storage)?
            .ok_or_else(|| miss(id))
    }

    #[instrument(skip(self), fields(kind = S::KIND))]
    pub async fn delete(&self, owner: &UserId, id: &str) -> Result<(), ScopeError> {
        if self.store.delete_owned(owner, id).await.map_err(storage)? {
            Ok(())
        } else {
            Err(miss(id))
        }
    }
}

fn miss(id: &str) -> ScopeError {
    debug!(record_id = %id, "No record for this owner");
    ScopeError::NotFound
}

fn storage(err: anyhow::Error) -> ScopeError {
    error!("Scoped storage access failed: {:#}", err);
    ScopeError::StorageUnavailable(err)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory store keyed by id, filtering by owner like the SQL stores do.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<String, (UserId, String)>>,
    }

    #[async_trait]
    impl OwnedStore for MemoryStore {
        type Record = (String, String);
        type Create = String;
        type Update = String;

        const KIND: &'static str = "note";

        async fn list_owned(&self, owner: &UserId) -> Result<Vec<Self::Record>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|(_, (o, _))| o == owner)
                .map(|(id, (_, v))| (id.clone(), v.clone()))
                .collect())
        }

        async fn insert_owned(&self, owner: &UserId, payload: String) -> Result<Self::Record> {
            let mut rows = self.rows.lock().unwrap();
            let id = format!("n{}", rows.len());
            rows.insert(id.clone(), (owner.clone(), payload.clone()));
            Ok((id, payload))
        }

        async fn get_owned(&self, owner: &UserId, id: &str) -> Result<Option<Self::Record>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .get(id)
                .filter(|(o, _)| o == owner)
                .map(|(_, v)| (id.to_string(), v.clone())))
        }

        async fn update_owned(
            &self,
            owner: &UserId,
            id: &str,
            payload: String,
        ) -> Result<Option<Self::Record>> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.get_mut(id).filter(|(o, _)| o == owner).map(|row| {
                row.1 = payload.clone();
                (id.to_string(), payload)
            }))
        }

        async fn delete_owned(&self, owner: &UserId, id: &str) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            if rows.get(id).is_some_and(|(o, _)| o == owner) {
                rows.remove(id);
                return Ok(true);
            }
            Ok(false)
        }
    }

    struct FailingStore;

    #[async_trait]
    impl OwnedStore for FailingStore {
        type Record = ();
        type Create = ();
        type Update = ();

        const KIND: &'static str = "broken";

        async fn list_owned(&self, _: &UserId) -> Result<Vec<()>> {
            anyhow::bail!("disk on fire")
        }
        async fn insert_owned(&self, _: &UserId, _: ()) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
        async fn get_owned(&self, _: &UserId, _: &str) -> Result<Option<()>> {
            anyhow::bail!("disk on fire")
        }
        async fn update_owned(&self, _: &UserId, _: &str, _: ()) -> Result<Option<()>> {
            anyhow::bail!("disk on fire")
        }
        async fn delete_owned(&self, _: &UserId, _: &str) -> Result<bool> {
            anyhow::bail!("disk on fire")
        }
    }

    fn user(id: &str) -> UserId {
        UserId::from(id.to_string())
    }

    #[tokio::test]
    async fn test_foreign_record_is_not_found() {
        let gate = OwnershipGate::new(MemoryStore::default());
        let (alice, bob) = (user("usr_a"), user("usr_b"));

        let (id, _) = gate.create(&alice, "pepper".to_string()).await.unwrap();

        assert!(matches!(gate.get(&bob, &id).await, Err(ScopeError::NotFound)));
        assert!(matches!(
            gate.update(&bob, &id, "salt".to_string()).await,
            Err(ScopeError::NotFound)
        ));
        assert!(matches!(gate.delete(&bob, &id).await, Err(ScopeError::NotFound)));
        assert!(gate.list(&bob).await.unwrap().is_empty());

        // Untouched for the owner.
        assert_eq!(gate.get(&alice, &id).await.unwrap().1, "pepper");
    }

    #[tokio::test]
    async fn test_missing_and_foreign_are_indistinguishable() {
        let gate = OwnershipGate::new(MemoryStore::default());
        let (alice, bob) = (user("usr_a"), user("usr_b"));
        let (id, _) = gate.create(&alice, "cumin".to_string()).await.unwrap();

        let foreign = gate.get(&bob, &id).await.unwrap_err();
        let missing = gate.get(&bob, "does-not-exist").await.unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let gate = OwnershipGate::new(FailingStore);
        let owner = user("usr_a");
        assert!(matches!(
            gate.list(&owner).await,
            Err(ScopeError::StorageUnavailable(_))
        ));
        assert!(matches!(
            gate.get(&owner, "x").await,
            Err(ScopeError::StorageUnavailable(_))
        ));
    }
}
