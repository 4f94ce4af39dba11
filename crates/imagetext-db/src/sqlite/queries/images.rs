use chrono::Utc;
use rusqlite::{params, Row};

use imagetext_core::image::{CreateImage, ImageFormat, ImageRecord};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_image(row: &Row) -> rusqlite::Result<ImageRecord> {
    let format: String = row.get("format")?;
    Ok(ImageRecord {
        id: row.get("id")?,
        format: ImageFormat::from_str(&format).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown image format {format}").into(),
            )
        })?,
        filename: row.get("filename")?,
        size_bytes: row.get("size_bytes")?,
        extracted_text: row.get("extracted_text")?,
        created_at: row.get("created_at")?,
        data: row.get("data")?,
    })
}

impl SqliteDatabase {
    pub fn create_image_sync(&self, input: &CreateImage) -> Result<ImageRecord, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO images (id, format, filename, size_bytes, data, extracted_text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    input.format.as_str(),
                    input.filename,
                    input.data.len() as i64,
                    input.data,
                    input.extracted_text,
                    now
                ],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM images WHERE id = ?1",
                params![id],
                row_to_image,
            )
            .to_db()
        })
    }

    pub fn get_image_sync(&self, id: &str) -> Result<ImageRecord, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM images WHERE id = ?1",
                params![id],
                row_to_image,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("image {id}")),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn count_images_sync(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT count(*) FROM images", [], |r| r.get(0))
                .to_db()
        })
    }
}
