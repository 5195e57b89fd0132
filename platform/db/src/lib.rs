//! Database primitives and the user directory consumed by the access gate.

mod directory;
mod sessions;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub use directory::{
    NewUser, create_department, create_user, find_department, find_user, find_user_by_email,
    list_departments, principal_for, user_count, users_with_role,
};
pub use sessions::{close_session, open_session, purge_expired_sessions, resolve_session};

/// Shared connection pool.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("failed to connect: {0}")]
    Connect(#[source] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("email {0} is already registered")]
    DuplicateEmail(String),
    #[error("department {0} does not exist")]
    UnknownDepartment(i32),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
    #[serde(default)]
    sqlx_logging: bool,
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            env_key: default_url_key(),
            max_connections: default_max_connections(),
            sqlx_logging: false,
        }
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            ..Self::default()
        }
    }

    /// Reads `DB_MAX_CONNECTIONS` and `DB_SQL_LOGGING` on top of the defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(max) = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            settings.max_connections = max.max(1);
        }
        settings.sqlx_logging = std::env::var("DB_SQL_LOGGING")
            .ok()
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        settings
    }

    pub fn database_url(&self) -> DbResult<String> {
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl(self.env_key.clone()))
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    connect_url(&url, settings).await
}

pub async fn connect_url(url: &str, settings: &DatabaseSettings) -> DbResult<DbPool> {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(settings.sqlx_logging);
    let pool = Database::connect(options).await.map_err(DbError::Connect)?;
    info!(backend = ?pool.get_database_backend(), "database connected");
    Ok(pool)
}
