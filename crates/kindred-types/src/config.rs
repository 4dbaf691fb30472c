//! Global configuration types for Kindred.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! completion backend and tunes the chat pipeline.

use serde::{Deserialize, Serialize};

use crate::discovery::MergePolicy;
use crate::llm::ProviderConfig;

/// Top-level configuration for the Kindred platform.
///
/// Loaded from `~/.kindred/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Completion backend bound at startup.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Upper bound on a single completion call before it counts as failed.
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,

    /// Most recent messages replayed to the model per turn. 0 = unbounded.
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: u32,

    /// Dedup policy when accepting discoveries into a profile.
    #[serde(default)]
    pub discovery_merge: MergePolicy,

    /// Model override for the prompt enhancer; the provider model otherwise.
    #[serde(default)]
    pub enhancer_model: Option<String>,
}

fn default_completion_timeout_secs() -> u64 {
    60
}

fn default_max_history_messages() -> u32 {
    50
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            completion_timeout_secs: default_completion_timeout_secs(),
            max_history_messages: default_max_history_messages(),
            discovery_merge: MergePolicy::default(),
            enhancer_model: None,
        }
    }
}
