//! User accounts: storage, registration and login.

mod models;
mod repository;
mod service;

pub use models::{Credentials, LoginResponse, NewUser, User, UserId, UserInfo};
pub use repository::{CredentialStore, InsertUserError, UserRepository};
pub use service::{MIN_PASSWORD_LEN, UserService, normalize_email};
