//! List users command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_users().await?;

    if users.is_empty() {
        println!("No users registered.");
        println!();
        println!("Create one with: lendtrack create-admin <username> <email> <password>");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let marker = if user.role == "admin" { "★" } else { "•" };
        println!("{} {} <{}>", marker, user.username, user.email);
        println!("  ID: {} | Role: {}", user.id, user.role);
    }

    println!();
    println!("Legend: ★ Admin | • User");

    Ok(())
}
