//! Reset database command handler

use std::io::{self, Write};

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_reset_db(config: &Config, skip_confirm: bool) -> anyhow::Result<()> {
    if !skip_confirm {
        print!(
            "This deletes every user, item and request in {}. Continue? [y/N] ",
            config.general.database_path
        );
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;

        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let store = Store::new(&config.general.database_path).await?;
    store.reset().await?;

    println!("✓ Database reset. All tables dropped and recreated.");
    Ok(())
}
