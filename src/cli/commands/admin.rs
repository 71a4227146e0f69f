//! Create admin command handler

use crate::api::MIN_PASSWORD_LEN;
use crate::config::Config;
use crate::db::{NewUser, Store, is_unique_violation};
use crate::models::Role;

pub async fn cmd_create_admin(
    config: &Config,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() || email.is_empty() {
        println!("Username and email cannot be empty");
        return Ok(());
    }

    if password.len() < MIN_PASSWORD_LEN {
        println!("Password must be at least {MIN_PASSWORD_LEN} characters");
        return Ok(());
    }

    let store = Store::new(&config.general.database_path).await?;

    let result = store
        .create_user(
            NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: Role::Admin.as_str().to_string(),
            },
            &config.security,
        )
        .await;

    match result {
        Ok(user) => {
            println!("✓ Created admin '{}' (ID: {})", user.username, user.id);
            Ok(())
        }
        Err(e) if is_unique_violation(&e) => {
            println!("Username or email already registered: {username} / {email}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
