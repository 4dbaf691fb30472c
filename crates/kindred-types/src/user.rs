use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a user, wrapping a UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("invalid user role: '{other}'")),
        }
    }
}

/// A user and the personalization facts the companion knows about them.
///
/// `interests` and `personality_traits` are ordered sets: no duplicates,
/// first occurrence wins. They grow through accepted discoveries and are
/// replaced wholesale only by an explicit profile edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub role: UserRole,
    pub interests: Vec<String>,
    pub personality_traits: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub role: UserRole,
}

/// Explicit profile edit. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub personality_traits: Option<Vec<String>>,
}
