use chrono::{DateTime, Utc};

use imagetext_core::image::{CreateImage, ImageFormat, ImageRecord};

use super::super::{pg_err, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: String,
    format: String,
    filename: String,
    size_bytes: i64,
    data: Vec<u8>,
    extracted_text: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ImageRow> for ImageRecord {
    type Error = DbError;

    fn try_from(r: ImageRow) -> Result<Self, DbError> {
        let format = ImageFormat::from_str(&r.format)
            .ok_or_else(|| DbError::Internal(format!("unknown image format {}", r.format)))?;
        Ok(ImageRecord {
            id: r.id,
            format,
            filename: r.filename,
            size_bytes: r.size_bytes,
            extracted_text: r.extracted_text,
            created_at: r.created_at,
            data: r.data,
        })
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_create_image(
        &self,
        input: &CreateImage,
    ) -> Result<ImageRecord, DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let row = sqlx::query_as::<_, ImageRow>(
            "INSERT INTO images (id, format, filename, size_bytes, data, extracted_text, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&id)
        .bind(input.format.as_str())
        .bind(&input.filename)
        .bind(input.data.len() as i64)
        .bind(&input.data)
        .bind(&input.extracted_text)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        row.try_into()
    }

    pub(crate) async fn pg_get_image(&self, id: &str) -> Result<ImageRecord, DbError> {
        sqlx::query_as::<_, ImageRow>("SELECT * FROM images WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?
            .ok_or_else(|| pg_not_found(&format!("image {id}")))?
            .try_into()
    }

    pub(crate) async fn pg_count_images(&self) -> Result<i64, DbError> {
        sqlx::query_scalar("SELECT count(*) FROM images")
            .fetch_one(&self.pool)
            .await
            .map_err(pg_err)
    }
}
