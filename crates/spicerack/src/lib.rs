//! Spicerack library.
//!
//! A multi-tenant HTTP API: users register and log in for a signed session
//! token, manage their own spice categories, and share a product catalog.

pub mod api;
pub mod auth;
pub mod category;
pub mod config;
pub mod db;
pub mod ownership;
pub mod product;
pub mod server;
pub mod user;
