pub(crate) mod migrations;
pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use imagetext_core::contact::{Contact, CreateContact};
use imagetext_core::image::{CreateImage, ImageRecord};

use crate::{Database, DbError};

/// Map a sqlx::Error into a DbError::Internal.
pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    DbError::Internal(e.to_string())
}

/// Create a DbError::NotFound with the given entity description.
pub(crate) fn pg_not_found(entity: &str) -> DbError {
    DbError::NotFound(entity.to_string())
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    /// Connect to a Postgres database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(pg_err)?;

        let db = Self { pool };
        migrations::run(&db.pool).await?;
        Ok(db)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    // -- Images --
    async fn create_image(&self, input: &CreateImage) -> Result<ImageRecord, DbError> {
        self.pg_create_image(input).await
    }
    async fn get_image(&self, id: &str) -> Result<ImageRecord, DbError> {
        self.pg_get_image(id).await
    }
    async fn count_images(&self) -> Result<i64, DbError> {
        self.pg_count_images().await
    }

    // -- Contacts --
    async fn create_contact(&self, input: &CreateContact) -> Result<Contact, DbError> {
        self.pg_create_contact(input).await
    }
    async fn get_contact(&self, id: &str) -> Result<Contact, DbError> {
        self.pg_get_contact(id).await
    }
    async fn count_contacts(&self) -> Result<i64, DbError> {
        self.pg_count_contacts().await
    }
}
