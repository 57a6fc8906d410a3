//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthState;
use crate::category::SpiceCategoryRepository;
use crate::ownership::OwnershipGate;
use crate::product::ProductRepository;
use crate::user::UserService;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Registration and login.
    pub users: UserService,
    /// Token verification for the protected route group.
    pub auth: AuthState,
    /// Owner-scoped spice categories.
    pub categories: Arc<OwnershipGate<SpiceCategoryRepository>>,
    /// Shared product catalog.
    pub products: ProductRepository,
    /// Put the product routes behind authentication.
    pub catalog_requires_auth: bool,
    /// Allowed CORS origins. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        users: UserService,
        auth: AuthState,
        categories: SpiceCategoryRepository,
        products: ProductRepository,
    ) -> Self {
        Self {
            users,
            auth,
            categories: Arc::new(OwnershipGate::new(categories)),
            products,
            catalog_requires_auth: false,
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_catalog_auth(mut self, required: bool) -> Self {
        self.catalog_requires_auth = required;
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}
