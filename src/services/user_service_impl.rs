//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::models::Role;
use crate::services::user_service::{CreateUser, UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

pub(crate) fn parse_role(role: &str) -> Result<Role, UserError> {
    role.parse::<Role>()
        .map_err(|e| UserError::Validation(e.to_string()))
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.list_users().await?)
    }

    async fn get_user(&self, id: i32) -> Result<User, UserError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn create_user(&self, input: CreateUser) -> Result<User, UserError> {
        let role = input
            .role
            .as_deref()
            .map_or(Ok(Role::User), parse_role)?;

        let user = self
            .store
            .create_user(
                NewUser {
                    username: input.username.trim().to_string(),
                    email: input.email.trim().to_string(),
                    password: input.password,
                    role: role.as_str().to_string(),
                },
                &self.security,
            )
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, role = %role, "User created");
        Ok(user)
    }

    async fn update_role(&self, id: i32, role: &str) -> Result<User, UserError> {
        let role = parse_role(role)?;

        let user = self
            .store
            .update_user_role(id, role.as_str())
            .await?
            .ok_or(UserError::NotFound(id))?;

        tracing::info!(user_id = id, role = %role, "User role updated");
        Ok(user)
    }

    async fn delete_user(&self, id: i32) -> Result<(), UserError> {
        if self.store.delete_user(id).await? {
            tracing::info!(user_id = id, "User deleted");
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }
}
