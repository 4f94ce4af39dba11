use sqlx::{PgConnection, PgPool};
use tracing::warn;

use crate::DbError;

/// Fixed key for the advisory lock that serialises migration runs across
/// concurrently starting servers.
const MIGRATION_LOCK_KEY: i64 = 0x696D_6167_6574_7874; // "imagetxt"

pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    // Advisory locks belong to a session, so lock, migrate and unlock all
    // happen on one connection.
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    let result = run_inner(&mut conn).await;

    // Release even when a migration failed.
    match sqlx::query_scalar::<_, bool>("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await
    {
        Ok(true) => {}
        Ok(false) => warn!("migration lock {MIGRATION_LOCK_KEY:#x} was not held at unlock"),
        Err(e) => warn!("failed to release migration lock {MIGRATION_LOCK_KEY:#x}: {e}"),
    }

    result
}

async fn run_inner(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::Internal(e.to_string()))?;

    let current: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    if current < 1 {
        sqlx::raw_sql(include_str!("sql/V1__initial.sql"))
            .execute(&mut *conn)
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?;
    }

    Ok(())
}
