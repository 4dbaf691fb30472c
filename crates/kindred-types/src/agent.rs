use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::{UserId, UserRole};

/// Unique identifier for an agent, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A chat persona: a name, a system prompt, and display metadata.
///
/// Agents are immutable after creation. Default agents are seeded by an
/// admin and can never be deleted; custom agents are deletable by their owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    /// Short description shown in listings.
    pub description: String,
    /// Free-text persona handed to the model as the first part of the context block.
    pub system_prompt: String,
    /// Icon name rendered by clients (e.g. "Bot", "Heart").
    pub icon: String,
    /// CSS gradient classes rendered by clients.
    pub color: String,
    pub preferred_length: PreferredLength,
    pub is_default: bool,
    pub is_custom: bool,
    pub is_public: bool,
    pub owner_id: Option<UserId>,
    pub owner_type: OwnerType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Whether `user` may chat with this agent.
    pub fn is_visible_to(&self, user: &UserId) -> bool {
        self.is_public || self.is_default || self.owner_id.as_ref() == Some(user)
    }
}

pub const DEFAULT_AGENT_ICON: &str = "Bot";
pub const DEFAULT_AGENT_COLOR: &str = "from-blue-500 to-cyan-500";

/// Three-tier response-size policy attached to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredLength {
    Small,
    #[default]
    Medium,
    Long,
}

impl PreferredLength {
    /// Parse a stored or user-supplied label, falling back to `Medium`
    /// for anything unrecognized.
    pub fn from_label(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for PreferredLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferredLength::Small => write!(f, "small"),
            PreferredLength::Medium => write!(f, "medium"),
            PreferredLength::Long => write!(f, "long"),
        }
    }
}

impl FromStr for PreferredLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(PreferredLength::Small),
            "medium" => Ok(PreferredLength::Medium),
            "long" => Ok(PreferredLength::Long),
            other => Err(format!("invalid preferred length: '{other}'")),
        }
    }
}

/// Who created an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    Admin,
    User,
}

impl From<UserRole> for OwnerType {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => OwnerType::Admin,
            UserRole::User => OwnerType::User,
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerType::Admin => write!(f, "admin"),
            OwnerType::User => write!(f, "user"),
        }
    }
}

impl FromStr for OwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(OwnerType::Admin),
            "user" => Ok(OwnerType::User),
            other => Err(format!("invalid owner type: '{other}'")),
        }
    }
}

/// Request to create a new agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub system_prompt: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub preferred_length: PreferredLength,
    #[serde(default)]
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(owner: Option<UserId>, is_public: bool, is_default: bool) -> Agent {
        let now = Utc::now();
        Agent {
            id: AgentId::new(),
            name: "Luna".to_string(),
            description: String::new(),
            system_prompt: "You are Luna.".to_string(),
            icon: DEFAULT_AGENT_ICON.to_string(),
            color: DEFAULT_AGENT_COLOR.to_string(),
            preferred_length: PreferredLength::Medium,
            is_default,
            is_custom: !is_default,
            is_public,
            owner_id: owner,
            owner_type: OwnerType::User,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_preferred_length_lenient_fallback() {
        assert_eq!(PreferredLength::from_label("small"), PreferredLength::Small);
        assert_eq!(PreferredLength::from_label(" LONG "), PreferredLength::Long);
        assert_eq!(PreferredLength::from_label("gigantic"), PreferredLength::Medium);
        assert_eq!(PreferredLength::from_label(""), PreferredLength::Medium);
    }

    #[test]
    fn test_preferred_length_strict_parse_rejects_unknown() {
        assert!("huge".parse::<PreferredLength>().is_err());
    }

    #[test]
    fn test_create_agent_request_defaults() {
        let json = r#"{"name":"Sage","system_prompt":"You are wise."}"#;
        let req: CreateAgentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.preferred_length, PreferredLength::Medium);
        assert!(!req.is_public);
        assert!(req.icon.is_none());
        assert!(req.description.is_empty());
    }

    #[test]
    fn test_agent_visibility() {
        let me = UserId::new();
        let other = UserId::new();

        assert!(agent(Some(me), false, false).is_visible_to(&me));
        assert!(!agent(Some(other), false, false).is_visible_to(&me));
        assert!(agent(Some(other), true, false).is_visible_to(&me));
        assert!(agent(None, false, true).is_visible_to(&me));
    }

    #[test]
    fn test_owner_type_from_role() {
        assert_eq!(OwnerType::from(UserRole::Admin), OwnerType::Admin);
        assert_eq!(OwnerType::from(UserRole::User), OwnerType::User);
    }
}
