use chrono::Utc;
use rusqlite::{params, Row};

use imagetext_core::contact::{Contact, CreateContact};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_contact(row: &Row) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get("id")?,
        name: row.get("name")?,
        phone_number: row.get("phone_number")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_contact_sync(&self, input: &CreateContact) -> Result<Contact, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO contacts (id, name, phone_number, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, input.name, input.phone_number, input.email, now],
            )
            .map_err(|e| match e.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => DbError::Conflict(format!(
                    "a contact with email {} already exists",
                    input.email
                )),
                _ => DbError::Internal(e.to_string()),
            })?;
            conn.query_row(
                "SELECT * FROM contacts WHERE id = ?1",
                params![id],
                row_to_contact,
            )
            .to_db()
        })
    }

    pub fn get_contact_sync(&self, id: &str) -> Result<Contact, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM contacts WHERE id = ?1",
                params![id],
                row_to_contact,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("contact {id}"))
                }
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn count_contacts_sync(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT count(*) FROM contacts", [], |r| r.get(0))
                .to_db()
        })
    }
}
