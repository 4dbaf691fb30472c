//! Global configuration loader for Kindred.
//!
//! Reads `config.toml` from the data directory (`~/.kindred/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed. API keys never live in the file: the config
//! names an environment variable and the key is read from there.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use kindred_types::config::GlobalConfig;
use kindred_types::llm::ProviderConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "KINDRED_DATA_DIR";

/// Resolve the data directory: `$KINDRED_DATA_DIR`, else `~/.kindred`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kindred")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`GlobalConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Read the provider's API key from its configured environment variable.
pub fn resolve_api_key(config: &ProviderConfig) -> Option<SecretString> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] with an injectable variable lookup.
pub fn resolve_api_key_with(
    config: &ProviderConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    let var = config.api_key_env()?;
    let value = lookup(var)?;
    let value = value.trim();
    if value.is_empty() {
        tracing::debug!(env = var, "API key variable is set but empty");
        return None;
    }
    Some(SecretString::from(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_types::discovery::MergePolicy;
    use kindred_types::llm::ProviderType;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.provider.provider_type, ProviderType::Gemini);
        assert_eq!(config.completion_timeout_secs, 60);
        assert_eq!(config.max_history_messages, 50);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
completion_timeout_secs = 15
discovery_merge = "case_insensitive"

[provider]
provider_type = "ollama"
model = "qwen2.5:7b"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.completion_timeout_secs, 15);
        assert_eq!(config.discovery_merge, MergePolicy::CaseInsensitive);
        assert_eq!(config.provider.provider_type, ProviderType::Ollama);
        assert_eq!(config.provider.model(), "qwen2.5:7b");
        assert_eq!(config.provider.base_url(), "http://127.0.0.1:11434");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.completion_timeout_secs, 60);
    }

    #[test]
    fn resolve_api_key_reads_named_variable() {
        let config = ProviderConfig {
            api_key_env: Some("MY_KEY".to_string()),
            ..Default::default()
        };
        let key = resolve_api_key_with(&config, |name| {
            (name == "MY_KEY").then(|| " secret-value ".to_string())
        })
        .unwrap();
        assert_eq!(key.expose_secret(), "secret-value");
    }

    #[test]
    fn resolve_api_key_defaults_per_backend() {
        let gemini = ProviderConfig::default();
        let key = resolve_api_key_with(&gemini, |name| {
            (name == "GEMINI_API_KEY").then(|| "g-key".to_string())
        });
        assert!(key.is_some());

        let ollama = ProviderConfig {
            provider_type: ProviderType::Ollama,
            ..Default::default()
        };
        assert!(resolve_api_key_with(&ollama, |_| Some("unused".to_string())).is_none());
    }

    #[test]
    fn resolve_api_key_ignores_blank_values() {
        let config = ProviderConfig::default();
        assert!(resolve_api_key_with(&config, |_| Some("   ".to_string())).is_none());
        assert!(resolve_api_key_with(&config, |_| None).is_none());
    }
}
