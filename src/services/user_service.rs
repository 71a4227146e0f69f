//! Domain service for user accounts.
//!
//! Handles account creation by administrators, role changes and removal.
//! Self-registration lives in the auth service.

use serde::Deserialize;
use thiserror::Error;

use crate::db::User;

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i32),

    #[error("Username or email already registered")]
    Conflict,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            Self::Conflict
        } else {
            Self::Persistence(format!("{err:#}"))
        }
    }
}

/// Payload for creating a user with an explicit role.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    async fn get_user(&self, id: i32) -> Result<User, UserError>;

    /// Creates a user; the role defaults to `user`.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Conflict`] if the username or email is taken.
    async fn create_user(&self, input: CreateUser) -> Result<User, UserError>;

    async fn update_role(&self, id: i32, role: &str) -> Result<User, UserError>;

    async fn delete_user(&self, id: i32) -> Result<(), UserError>;
}
