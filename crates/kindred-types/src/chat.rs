//! Conversation and message types.
//!
//! A conversation is keyed by `(user, agent)`; there is at most one live
//! conversation per pair. Messages are append-only and ordered oldest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::agent::AgentId;
use crate::discovery::Discoveries;
use crate::emotion::{Emotion, EmotionReading};
use crate::user::UserId;

/// Who authored a stored chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(format!("invalid chat role: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: UserId,
    pub agent_id: AgentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single stored message. Never mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub emotion: Emotion,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(conversation_id: Uuid, role: ChatRole, content: String, emotion: Emotion) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role,
            content,
            emotion,
            created_at: Utc::now(),
        }
    }
}

/// Output of the reply composer: the visible text plus any discoveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedReply {
    pub reply: String,
    pub discoveries: Option<Discoveries>,
}

/// What a caller gets back from sending one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub emotion: EmotionReading,
    pub discoveries: Option<Discoveries>,
}

/// Per-user dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Number of conversations the user has started.
    pub total_chats: u64,
    /// Default agents available to everyone.
    pub default_agents: u64,
    /// Non-default agents visible to the user.
    pub custom_agents: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_role_parse() {
        assert_eq!("assistant".parse::<ChatRole>().unwrap(), ChatRole::Assistant);
        assert!("model".parse::<ChatRole>().is_err());
    }

    #[test]
    fn test_chat_message_new_sets_fields() {
        let conv = Uuid::now_v7();
        let msg = ChatMessage::new(conv, ChatRole::User, "hi".to_string(), Emotion::Happy);
        assert_eq!(msg.conversation_id, conv);
        assert_eq!(msg.role, ChatRole::User);
        assert_eq!(msg.emotion, Emotion::Happy);
    }
}
