use anyhow::{Context, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::RequestStatus;

pub mod migrator;
pub mod repositories;

pub use repositories::item::{Item, ItemChanges, NewItem};
pub use repositories::request::{BorrowRequest, RequestChanges, RequestWrite};
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    /// Connects, creating the SQLite file and its directory when needed, and
    /// applies pending migrations.
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        if let Some(file) = sqlite_file_path(db_url) {
            ensure_database_file(file).await?;
        }

        let mut options = ConnectOptions::new(db_url.to_owned());
        options
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .with_context(|| format!("Cannot open database {db_url}"))?;
        migrator::Migrator::up(&conn, None)
            .await
            .context("Migrations failed")?;

        info!(
            max_connections,
            min_connections, "Database ready, schema up to date"
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Rolls back every migration and applies them again, dropping all rows.
    pub async fn reset(&self) -> Result<()> {
        migrator::Migrator::refresh(&self.conn).await?;
        info!("Database reset: all tables dropped and recreated");
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn item_repo(&self) -> repositories::item::ItemRepository {
        repositories::item::ItemRepository::new(self.conn.clone())
    }

    fn request_repo(&self) -> repositories::request::RequestRepository {
        repositories::request::RequestRepository::new(self.conn.clone())
    }

    // Users

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn create_user(&self, user: NewUser, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(user, config).await
    }

    pub async fn update_user_role(&self, id: i32, role: &str) -> Result<Option<User>> {
        self.user_repo().update_role(id, role).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo()
            .verify_password(username, password, config)
            .await
    }

    // Items

    pub async fn list_items(&self) -> Result<Vec<Item>> {
        self.item_repo().list().await
    }

    pub async fn get_item(&self, id: i32) -> Result<Option<Item>> {
        self.item_repo().get(id).await
    }

    pub async fn create_item(&self, item: NewItem) -> Result<Item> {
        self.item_repo().create(item).await
    }

    pub async fn update_item(&self, id: i32, changes: ItemChanges) -> Result<Option<Item>> {
        self.item_repo().update(id, changes).await
    }

    pub async fn delete_item(&self, id: i32) -> Result<bool> {
        self.item_repo().delete(id).await
    }

    // Requests

    pub async fn list_requests(&self) -> Result<Vec<BorrowRequest>> {
        self.request_repo().list().await
    }

    pub async fn get_request(&self, id: i32) -> Result<Option<BorrowRequest>> {
        self.request_repo().get(id).await
    }

    pub async fn create_request(
        &self,
        user_id: i32,
        item_id: i32,
        status: RequestStatus,
    ) -> Result<RequestWrite> {
        self.request_repo().create(user_id, item_id, status).await
    }

    pub async fn update_request(&self, id: i32, changes: RequestChanges) -> Result<RequestWrite> {
        self.request_repo().update(id, changes).await
    }

    pub async fn delete_request(&self, id: i32) -> Result<bool> {
        self.request_repo().delete(id).await
    }
}

/// On-disk path of a SQLite URL, or `None` for an in-memory database.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    if db_url.contains(":memory:") || db_url.contains("mode=memory") {
        return None;
    }

    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .unwrap_or(db_url);
    rest.split('?').next().filter(|p| !p.is_empty())
}

async fn ensure_database_file(file: &str) -> Result<()> {
    let path = Path::new(file);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Cannot create database directory {}", dir.display()))?;
    }

    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        tokio::fs::File::create(path)
            .await
            .with_context(|| format!("Cannot create database file {file}"))?;
    }

    Ok(())
}

/// Whether any error in the chain is a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<DbErr>()
            .and_then(DbErr::sql_err)
            .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(sqlite_file_path("sqlite:data/app.db"), Some("data/app.db"));
        assert_eq!(sqlite_file_path("sqlite://app.db?mode=rwc"), Some("app.db"));
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("sqlite:file:test?mode=memory"), None);
    }

    #[test]
    fn test_plain_errors_are_not_unique_violations() {
        let err = anyhow::anyhow!("disk full");
        assert!(!is_unique_violation(&err));

        let err = anyhow::Error::new(DbErr::Custom("boom".to_string())).context("insert failed");
        assert!(!is_unique_violation(&err));
    }

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    fn laptop() -> NewItem {
        NewItem {
            name: "Laptop".to_string(),
            item_type: "Computer".to_string(),
            serial_number: "SN-1".to_string(),
            condition: "New".to_string(),
            status: "Available".to_string(),
            location: "School".to_string(),
            photo_url: "/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_reset_drops_all_rows() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.create_item(laptop()).await.unwrap();
        assert_eq!(store.list_items().await.unwrap().len(), 1);

        store.reset().await.unwrap();

        assert!(store.list_items().await.unwrap().is_empty());
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_deleting_item_cascades_to_requests() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let user = store
            .create_user(
                NewUser {
                    username: "alice".to_string(),
                    email: "alice@example.com".to_string(),
                    password: "correct-horse".to_string(),
                    role: "user".to_string(),
                },
                &fast_security(),
            )
            .await
            .unwrap();
        let item = store.create_item(laptop()).await.unwrap();

        let write = store
            .create_request(user.id, item.id, RequestStatus::Pending)
            .await
            .unwrap();
        assert!(matches!(write, RequestWrite::Saved(_)));

        assert!(store.delete_item(item.id).await.unwrap());
        assert!(store.list_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let user = || NewUser {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "correct-horse".to_string(),
            role: "user".to_string(),
        };

        store.create_user(user(), &fast_security()).await.unwrap();
        let err = store
            .create_user(user(), &fast_security())
            .await
            .unwrap_err();

        assert!(is_unique_violation(&err));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_user_password_outcomes() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = fast_security();
        store
            .create_user(
                NewUser {
                    username: "carol".to_string(),
                    email: "carol@example.com".to_string(),
                    password: "correct-horse".to_string(),
                    role: "user".to_string(),
                },
                &security,
            )
            .await
            .unwrap();

        let found = store
            .verify_user_password("carol", "correct-horse", &security)
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.username), Some("carol".to_string()));

        assert!(
            store
                .verify_user_password("carol", "wrong-horse", &security)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .verify_user_password("nobody", "correct-horse", &security)
                .await
                .unwrap()
                .is_none()
        );
    }
}
