//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod agent;
pub mod conversation;
pub mod pool;
pub mod user;

use chrono::{DateTime, Utc};
use kindred_types::error::RepositoryError;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub(crate) fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}
