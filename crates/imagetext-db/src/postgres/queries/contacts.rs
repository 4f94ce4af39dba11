use chrono::{DateTime, Utc};

use imagetext_core::contact::{Contact, CreateContact};

use super::super::{pg_err, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: String,
    name: String,
    phone_number: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(r: ContactRow) -> Self {
        Contact {
            id: r.id,
            name: r.name,
            phone_number: r.phone_number,
            email: r.email,
            created_at: r.created_at,
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_create_contact(
        &self,
        input: &CreateContact,
    ) -> Result<Contact, DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let row = sqlx::query_as::<_, ContactRow>(
            "INSERT INTO contacts (id, name, phone_number, email, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return DbError::Conflict(format!(
                        "a contact with email {} already exists",
                        input.email
                    ));
                }
            }
            pg_err(e)
        })?;

        Ok(row.into())
    }

    pub(crate) async fn pg_get_contact(&self, id: &str) -> Result<Contact, DbError> {
        let row = sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?
            .ok_or_else(|| pg_not_found(&format!("contact {id}")))?;

        Ok(row.into())
    }

    pub(crate) async fn pg_count_contacts(&self) -> Result<i64, DbError> {
        sqlx::query_scalar("SELECT count(*) FROM contacts")
            .fetch_one(&self.pool)
            .await
            .map_err(pg_err)
    }
}
