//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` keeps a
//! multi-connection reader pool for concurrent reads and a single-connection
//! writer pool for serialized writes. Both use WAL and enforce foreign keys.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database, run pending migrations, then open the reader pool.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(base_opts)
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }
}

/// Database URL for `kindred.db` inside the data directory.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}/kindred.db?mode=rwc", data_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());

        let pool = DatabasePool::new(&url).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["agents", "api_keys", "conversations", "messages", "users"]
        );
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path())).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO conversations (id, user_id, agent_id, created_at, updated_at) VALUES ('c', 'missing', 'missing', 'x', 'x')",
        )
        .execute(&pool.writer)
        .await;
        assert!(result.is_err());
    }
}
