//! HTTP request handlers.

mod auth;
mod categories;
mod products;
mod system;

pub use auth::{login, me, register};
pub use categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use products::{create_product, delete_product, get_product, list_products, update_product};
pub use system::{HealthResponse, health};

use serde::Serialize;

/// Body returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
