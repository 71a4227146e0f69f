use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that overrides `security.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "LENDTRACK_JWT_SECRET";

/// Environment variable that overrides `general.database_path`.
pub const DATABASE_URL_ENV: &str = "LENDTRACK_DATABASE_URL";

const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,

    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human readable format
    pub log_json: bool,

    /// Tokio worker count; 0 lets tokio pick one per core
    pub worker_threads: usize,

    /// Connection pool bounds
    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/lendtrack.db".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret used to sign bearer tokens. When empty a random secret is
    /// generated at startup and tokens do not survive a restart.
    pub jwt_secret: String,

    /// Lifetime of issued tokens in minutes
    pub token_expiry_minutes: i64,

    /// Require a bearer token on every route except login/register/health,
    /// and the admin role on management routes.
    pub enforce_auth: bool,

    /// Argon2id cost parameters for newly hashed passwords. Existing hashes
    /// keep the parameters they were created with.
    pub argon2_memory_cost_kib: u32,

    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_minutes: 60,
            enforce_auth: false,
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

/// Admin account created on startup when no user with that name exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_username: Option<String>,

    pub admin_email: Option<String>,

    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
}

impl Config {
    /// Reads the first config file found in the search paths, falling back to
    /// defaults, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Self::load_from_path(&path)?
            }
            None => {
                info!("No configuration file found; using built-in defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;

        toml::from_str(&raw).with_context(|| format!("Cannot parse {}", path.display()))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        info!(path = %path.display(), "Configuration written");
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var(JWT_SECRET_ENV)
            && !secret.is_empty()
        {
            self.security.jwt_secret = secret;
        }

        if let Ok(url) = std::env::var(DATABASE_URL_ENV)
            && !url.is_empty()
        {
            self.general.database_path = url;
        }
    }

    /// `./config.toml`, then the platform config dir, then `~/.lendtrack`.
    fn config_paths() -> Vec<PathBuf> {
        let platform = dirs::config_dir().map(|d| d.join("lendtrack").join("config.toml"));
        let home = dirs::home_dir().map(|d| d.join(".lendtrack").join("config.toml"));

        std::iter::once(PathBuf::from(DEFAULT_CONFIG_FILE))
            .chain(platform)
            .chain(home)
            .collect()
    }

    /// Writes a default `config.toml` in the working directory. Returns
    /// `false` if one already exists.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            return Ok(false);
        }

        Self::default().save_to_path(path)?;
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("general.database_path cannot be empty");
        }

        if self.security.token_expiry_minutes <= 0 {
            anyhow::bail!("security.token_expiry_minutes must be > 0");
        }

        if self.bootstrap.admin_username.is_some()
            && self
                .bootstrap
                .admin_password
                .as_deref()
                .is_none_or(str::is_empty)
        {
            anyhow::bail!("bootstrap.admin_password is required when admin_username is set");
        }

        Ok(())
    }
}
