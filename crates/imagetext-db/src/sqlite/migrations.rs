use rusqlite::Connection;

use super::SqliteResultExt;
use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS images (
                 id              TEXT PRIMARY KEY,
                 format          TEXT NOT NULL CHECK(format IN ('png', 'jpeg')),
                 filename        TEXT NOT NULL DEFAULT '',
                 size_bytes      INTEGER NOT NULL,
                 data            BLOB NOT NULL,
                 extracted_text  TEXT NOT NULL DEFAULT '',
                 created_at      TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_images_created ON images(created_at);

             CREATE TABLE IF NOT EXISTS contacts (
                 id            TEXT PRIMARY KEY,
                 name          TEXT NOT NULL,
                 phone_number  TEXT NOT NULL,
                 email         TEXT NOT NULL,
                 created_at    TEXT NOT NULL
             );
             CREATE UNIQUE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email);",
        )
        .to_db()?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'))",
            [],
        )
        .to_db()?;
    }

    Ok(())
}
