//! Database primitives shared by the CRM crates and the CLI.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("invalid {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
    #[error("database connection failed: {0}")]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    max_connections: Option<u32>,
    #[serde(default)]
    sqlx_logging: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            env_key: default_url_key(),
            url: None,
            max_connections: None,
            sqlx_logging: false,
        }
    }
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            ..Self::default()
        }
    }

    /// Settings with an explicit url; the environment is not consulted.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Reads `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS` and `DATABASE_LOG`.
    pub fn from_env() -> DbResult<Self> {
        let mut settings = Self::default();
        if let Ok(raw) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            let parsed = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| DbError::InvalidSetting {
                    key: "DATABASE_MAX_CONNECTIONS",
                    value: raw.clone(),
                })?;
            settings.max_connections = Some(parsed);
        }
        settings.sqlx_logging = std::env::var("DATABASE_LOG")
            .ok()
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Ok(settings)
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn database_url(&self) -> DbResult<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl(self.env_key.clone()))
    }
}

/// Open a pool for the configured database.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    let mut options = ConnectOptions::new(url);
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(settings.sqlx_logging);
    if let Some(max) = settings.max_connections {
        options.max_connections(max);
    }
    let pool = Database::connect(options).await?;
    info!(backend = ?pool.get_database_backend(), "database connected");
    Ok(pool)
}
