//! SQLite agent repository implementation.
//!
//! Implements `AgentRepository` from `kindred-core` using sqlx with split read/write pools.

use sqlx::Row;

use kindred_core::repository::agent::{AgentFilter, AgentRepository};
use kindred_types::agent::{Agent, AgentId, OwnerType, PreferredLength};
use kindred_types::error::RepositoryError;
use kindred_types::user::UserId;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

/// SQLite-backed implementation of `AgentRepository`.
pub struct SqliteAgentRepository {
    pool: DatabasePool,
}

impl SqliteAgentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Agent.
struct AgentRow {
    id: String,
    name: String,
    description: String,
    system_prompt: String,
    icon: String,
    color: String,
    preferred_length: String,
    is_default: bool,
    is_custom: bool,
    is_public: bool,
    owner_id: Option<String>,
    owner_type: String,
    created_at: String,
    updated_at: String,
}

impl AgentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            system_prompt: row.try_get("system_prompt")?,
            icon: row.try_get("icon")?,
            color: row.try_get("color")?,
            preferred_length: row.try_get("preferred_length")?,
            is_default: row.try_get("is_default")?,
            is_custom: row.try_get("is_custom")?,
            is_public: row.try_get("is_public")?,
            owner_id: row.try_get("owner_id")?,
            owner_type: row.try_get("owner_type")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_agent(self) -> Result<Agent, RepositoryError> {
        let id = self
            .id
            .parse::<AgentId>()
            .map_err(|e| RepositoryError::Query(format!("invalid agent id: {e}")))?;

        let owner_id = self
            .owner_id
            .as_deref()
            .map(str::parse::<UserId>)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid owner id: {e}")))?;

        let preferred_length: PreferredLength = self
            .preferred_length
            .parse()
            .map_err(RepositoryError::Query)?;
        let owner_type: OwnerType = self.owner_type.parse().map_err(RepositoryError::Query)?;

        Ok(Agent {
            id,
            name: self.name,
            description: self.description,
            system_prompt: self.system_prompt,
            icon: self.icon,
            color: self.color,
            preferred_length,
            is_default: self.is_default,
            is_custom: self.is_custom,
            is_public: self.is_public,
            owner_id,
            owner_type,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl AgentRepository for SqliteAgentRepository {
    async fn create(&self, agent: &Agent) -> Result<Agent, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO agents (id, name, description, system_prompt, icon, color, preferred_length, is_default, is_custom, is_public, owner_id, owner_type, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(agent.id.to_string())
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(&agent.system_prompt)
        .bind(&agent.icon)
        .bind(&agent.color)
        .bind(agent.preferred_length.to_string())
        .bind(agent.is_default)
        .bind(agent.is_custom)
        .bind(agent.is_public)
        .bind(agent.owner_id.map(|id| id.to_string()))
        .bind(agent.owner_type.to_string())
        .bind(format_datetime(&agent.created_at))
        .bind(format_datetime(&agent.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(agent.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("FOREIGN KEY") => {
                Err(RepositoryError::Conflict("agent owner does not exist".to_string()))
            }
            Err(e) => Err(query_err(e)),
        }
    }

    async fn get_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM agents WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => Ok(Some(AgentRow::from_row(&row).map_err(query_err)?.into_agent()?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: Option<AgentFilter>) -> Result<Vec<Agent>, RepositoryError> {
        let filter = filter.unwrap_or_default();
        let mut sql = String::from("SELECT * FROM agents");
        let mut conditions: Vec<&str> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(user) = filter.visible_to {
            conditions.push("(is_public = 1 OR is_default = 1 OR owner_id = ?)");
            binds.push(user.to_string());
        }
        match filter.is_default {
            Some(true) => conditions.push("is_default = 1"),
            Some(false) => conditions.push("is_default = 0"),
            None => {}
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at ASC");

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let mut agents = Vec::with_capacity(rows.len());
        for row in &rows {
            agents.push(AgentRow::from_row(row).map_err(query_err)?.into_agent()?);
        }
        Ok(agents)
    }

    async fn delete(&self, id: &AgentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
