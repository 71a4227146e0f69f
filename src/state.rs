use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{BootstrapConfig, Config, SecurityConfig};
use crate::db::{NewUser, Store};
use crate::models::Role;
use crate::services::{
    AuthService, ItemService, RequestService, SeaOrmAuthService, SeaOrmItemService,
    SeaOrmRequestService, SeaOrmUserService, TokenIssuer, UserService, token,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub item_service: Arc<dyn ItemService>,

    pub request_service: Arc<dyn RequestService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        ensure_bootstrap_admin(&store, &config.bootstrap, &config.security).await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let tokens = TokenIssuer::new(
            &resolve_jwt_secret(&config.security),
            config.security.token_expiry_minutes,
        );

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService>;

        let item_service = Arc::new(SeaOrmItemService::new(store.clone())) as Arc<dyn ItemService>;

        let request_service =
            Arc::new(SeaOrmRequestService::new(store.clone())) as Arc<dyn RequestService>;

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            user_service,
            item_service,
            request_service,
        }
    }
}

fn resolve_jwt_secret(security: &SecurityConfig) -> String {
    if security.jwt_secret.is_empty() {
        warn!("No JWT secret configured; generated an ephemeral one. Tokens will not survive a restart");
        token::generate_secret()
    } else {
        security.jwt_secret.clone()
    }
}

/// Creates the configured admin account unless a user with that name exists.
/// Returns whether an account was created.
pub async fn ensure_bootstrap_admin(
    store: &Store,
    bootstrap: &BootstrapConfig,
    security: &SecurityConfig,
) -> anyhow::Result<bool> {
    let (Some(username), Some(password)) = (&bootstrap.admin_username, &bootstrap.admin_password)
    else {
        return Ok(false);
    };

    if store.get_user_by_username(username).await?.is_some() {
        return Ok(false);
    }

    let email = bootstrap
        .admin_email
        .clone()
        .unwrap_or_else(|| format!("{username}@localhost"));

    store
        .create_user(
            NewUser {
                username: username.clone(),
                email,
                password: password.clone(),
                role: Role::Admin.as_str().to_string(),
            },
            security,
        )
        .await?;

    info!("Bootstrap admin '{}' created", username);
    Ok(true)
}
