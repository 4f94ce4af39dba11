pub(crate) mod migrations;
pub mod queries;

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode};

use imagetext_core::contact::{Contact, CreateContact};
use imagetext_core::image::{CreateImage, ImageRecord};

use crate::{Database, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(migrations::run)
    }
}

/// Map a `rusqlite::Error` into a `DbError`. Unique-constraint failures
/// become `DbError::Conflict`; everything else is `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    match &e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == ErrorCode::ConstraintViolation =>
        {
            DbError::Conflict(msg.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => DbError::Internal(e.to_string()),
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Images --
    async fn create_image(&self, input: &CreateImage) -> Result<ImageRecord, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_image_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_image(&self, id: &str) -> Result<ImageRecord, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_image_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn count_images(&self) -> Result<i64, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.count_images_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Contacts --
    async fn create_contact(&self, input: &CreateContact) -> Result<Contact, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_contact_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_contact(&self, id: &str) -> Result<Contact, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_contact_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn count_contacts(&self) -> Result<i64, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.count_contacts_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}
