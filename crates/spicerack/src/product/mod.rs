//! Product catalog. Not owner-scoped.

mod models;
mod repository;

pub use models::{CreateProduct, Product, UpdateProduct};
pub use repository::ProductRepository;
