//! Spice category models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::user::UserId;

/// A spice category. Always belongs to exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SpiceCategory {
    pub id: String,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of a create request.
///
/// There is no owner field: the owner is always the authenticated caller, and
/// any `user_id` the client sends is dropped during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpiceCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateSpiceCategory {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        Ok(())
    }
}

/// Body of an update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSpiceCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateSpiceCategory {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be blank".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ignores_client_owner() {
        let payload: CreateSpiceCategory =
            serde_json::from_str(r#"{"name":"Chili","user_id":"usr_someone_else"}"#).unwrap();
        assert_eq!(payload.name, "Chili");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let blank = CreateSpiceCategory {
            name: "  ".to_string(),
            description: None,
        };
        assert!(blank.validate().is_err());

        assert!(UpdateSpiceCategory::default().validate().is_ok());
        let blank_rename = UpdateSpiceCategory {
            name: Some(String::new()),
            description: None,
        };
        assert!(blank_rename.validate().is_err());
    }
}
