//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::models::Role;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, RegisterUser};
use crate::services::token::{Claims, TokenIssuer};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenIssuer,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenIssuer, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .verify_user_password(username, password, &self.security)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let access_token = self.tokens.issue(&user)?;
        tracing::info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(LoginResult {
            access_token,
            token_type: "bearer",
        })
    }

    async fn register(&self, input: RegisterUser) -> Result<User, AuthError> {
        let user = self
            .store
            .create_user(
                NewUser {
                    username: input.username.trim().to_string(),
                    email: input.email.trim().to_string(),
                    password: input.password,
                    role: Role::User.as_str().to_string(),
                },
                &self.security,
            )
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(self.tokens.verify(token)?)
    }
}
