//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `kindred-core`. Interests and traits are
//! stored as JSON arrays; API keys are stored only as SHA-256 hashes.

use chrono::{NaiveDate, Utc};
use sqlx::Row;
use uuid::Uuid;

use kindred_core::repository::user::UserRepository;
use kindred_types::error::RepositoryError;
use kindred_types::user::{UserId, UserProfile, UserRole};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

const DOB_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to a domain `UserProfile`.
struct UserRow {
    id: String,
    full_name: String,
    email: String,
    dob: Option<String>,
    role: String,
    interests: String,
    personality_traits: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            dob: row.try_get("dob")?,
            role: row.try_get("role")?,
            interests: row.try_get("interests")?,
            personality_traits: row.try_get("personality_traits")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_profile(self) -> Result<UserProfile, RepositoryError> {
        let id = self
            .id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;

        let role: UserRole = self.role.parse().map_err(RepositoryError::Query)?;

        let dob = self
            .dob
            .as_deref()
            .map(|s| NaiveDate::parse_from_str(s, DOB_FORMAT))
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid dob: {e}")))?;

        let interests: Vec<String> = serde_json::from_str(&self.interests)
            .map_err(|e| RepositoryError::Query(format!("invalid interests JSON: {e}")))?;
        let personality_traits: Vec<String> = serde_json::from_str(&self.personality_traits)
            .map_err(|e| RepositoryError::Query(format!("invalid traits JSON: {e}")))?;

        Ok(UserProfile {
            id,
            full_name: self.full_name,
            email: self.email,
            dob,
            role,
            interests,
            personality_traits,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn to_json(list: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(list).map_err(|e| RepositoryError::Query(e.to_string()))
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<UserProfile>, RepositoryError> {
    rows.iter()
        .map(|row| UserRow::from_row(row).map_err(query_err)?.into_profile())
        .collect()
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &UserProfile) -> Result<UserProfile, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, full_name, email, dob, role, interests, personality_traits, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.dob.map(|d| d.format(DOB_FORMAT).to_string()))
        .bind(user.role.to_string())
        .bind(to_json(&user.interests)?)
        .bind(to_json(&user.personality_traits)?)
        .bind(format_datetime(&user.created_at))
        .bind(format_datetime(&user.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("email '{}' already exists", user.email)),
            ),
            Err(e) => Err(query_err(e)),
        }
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|row| UserRow::from_row(&row).map_err(query_err)?.into_profile())
            .transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|row| UserRow::from_row(&row).map_err(query_err)?.into_profile())
            .transpose()
    }

    async fn list(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        map_rows(&rows)
    }

    async fn update(&self, user: &UserProfile) -> Result<UserProfile, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET full_name = ?, dob = ?, interests = ?, personality_traits = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&user.full_name)
        .bind(user.dob.map(|d| d.format(DOB_FORMAT).to_string()))
        .bind(to_json(&user.interests)?)
        .bind(to_json(&user.personality_traits)?)
        .bind(format_datetime(&user.updated_at))
        .bind(user.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn add_api_key(
        &self,
        user_id: &UserId,
        key_hash: &str,
        label: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO api_keys (id, user_id, key_hash, label, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id.to_string())
        .bind(key_hash)
        .bind(label)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("FOREIGN KEY") => {
                Err(RepositoryError::NotFound)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict("api key already registered".to_string()))
            }
            Err(e) => Err(query_err(e)),
        }
    }

    async fn get_by_api_key_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let touched = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE key_hash = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(key_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query(
            "SELECT u.* FROM users u JOIN api_keys k ON k.user_id = u.id WHERE k.key_hash = ?",
        )
        .bind(key_hash)
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(query_err)?;

        row.map(|row| UserRow::from_row(&row).map_err(query_err)?.into_profile())
            .transpose()
    }
}
