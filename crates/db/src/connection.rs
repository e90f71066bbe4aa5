use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use bayline_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Open the shop database described by `database`.
///
/// Every connection enforces foreign keys (the schema leans on cascading
/// deletes for line items and events) and uses WAL journaling. The SQLite
/// busy timeout is derived from the configured acquire timeout so a writer
/// holding the database queues followers instead of failing them fast.
pub async fn connect(database: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let acquire_timeout = Duration::from_secs(database.timeout_secs.max(1));
    let busy_timeout_ms = acquire_timeout.as_millis().min(30_000);

    SqlitePoolOptions::new()
        .max_connections(database.max_connections.max(1))
        .acquire_timeout(acquire_timeout)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&database.url)
        .await
}

/// Single-connection in-memory database for tests. One connection is the
/// point: each `sqlite::memory:` connection is its own database.
#[cfg(test)]
pub(crate) fn memory_config() -> DatabaseConfig {
    DatabaseConfig { url: "sqlite::memory:".to_string(), max_connections: 1, timeout_secs: 30 }
}
