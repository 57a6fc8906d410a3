//! Spice categories, the owner-scoped resource.

mod models;
mod repository;

pub use models::{CreateSpiceCategory, SpiceCategory, UpdateSpiceCategory};
pub use repository::SpiceCategoryRepository;
