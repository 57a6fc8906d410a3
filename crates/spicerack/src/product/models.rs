//! Product models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog product. Shared by all callers; has no owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
}

impl CreateProduct {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        match self.price {
            None => return Err("price is required".to_string()),
            Some(price) => check_price(price)?,
        }
        check_stock(self.stock)
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be blank".to_string());
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        Ok(())
    }
}

fn check_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err("price must be greater than 0".to_string());
    }
    Ok(())
}

fn check_stock(stock: i64) -> Result<(), String> {
    if stock < 0 {
        return Err("stock must not be negative".to_string());
    }
    Ok(())
}
