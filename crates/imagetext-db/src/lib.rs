#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use imagetext_core::contact::{Contact, CreateContact};
use imagetext_core::image::{CreateImage, ImageRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent collection of image and contact records.
///
/// Records are insert-only: there is no update or delete.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Images --
    async fn create_image(&self, input: &CreateImage) -> Result<ImageRecord, DbError>;
    async fn get_image(&self, id: &str) -> Result<ImageRecord, DbError>;
    async fn count_images(&self) -> Result<i64, DbError>;

    // -- Contacts --
    /// Fails with `DbError::Conflict` when the email is already taken.
    async fn create_contact(&self, input: &CreateContact) -> Result<Contact, DbError>;
    async fn get_contact(&self, id: &str) -> Result<Contact, DbError>;
    async fn count_contacts(&self) -> Result<i64, DbError>;
}

/// Which backend a connection URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbBackend {
    SqliteMemory,
    SqliteFile(PathBuf),
    Postgres(String),
}

/// Database selection, built from a single connection URL.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    pub url: Option<String>,
}

impl DbConfig {
    pub fn new(url: Option<String>) -> Self {
        Self { url }
    }

    /// Read `DATABASE_URL`; unset means the default SQLite file.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
        }
    }

    pub fn backend(&self) -> Result<DbBackend, DbError> {
        let Some(url) = self.url.as_deref() else {
            return Ok(DbBackend::SqliteFile(data_dir().join("imagetext.db")));
        };
        if url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return Ok(DbBackend::SqliteMemory);
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(DbBackend::Postgres(url.to_string()));
        }
        if let Some(path) = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
        {
            if path.is_empty() {
                return Err(DbError::Internal(format!("missing sqlite path in {url}")));
            }
            return Ok(DbBackend::SqliteFile(PathBuf::from(path)));
        }
        Err(DbError::Internal(format!("unsupported database url: {url}")))
    }
}

/// Open the backend named by `config` and run its migrations.
pub async fn open_database(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    match config.backend()? {
        #[cfg(feature = "sqlite")]
        DbBackend::SqliteMemory => Ok(Arc::new(SqliteDatabase::open_in_memory()?)),
        #[cfg(feature = "sqlite")]
        DbBackend::SqliteFile(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Arc::new(SqliteDatabase::open_path(&path)?))
        }
        #[cfg(feature = "postgres")]
        DbBackend::Postgres(url) => Ok(Arc::new(PostgresDatabase::connect(&url).await?)),
        #[allow(unreachable_patterns)]
        other => Err(DbError::Internal(format!(
            "backend {other:?} is not compiled in"
        ))),
    }
}

/// Base directory for on-disk state: `$XDG_DATA_HOME/imagetext`, falling
/// back to `~/.local/share/imagetext`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("imagetext")
}
