//! Gateway and journal configuration from TOML (`[gateway]`, `[journal]`)
//!
//! ```toml
//! [gateway]
//! endpoint = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! default_model = "gpt-4.1"
//!
//! [journal]
//! path = "~/.local/share/agora/events.jsonl"
//! ```

use agora_domain::Model;
use serde::{Deserialize, Serialize};

/// Settings of the OpenAI-compatible LLM endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Model used for roles that do not name one
    pub default_model: Model,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            default_model: Model::default(),
        }
    }
}

impl FileGatewayConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Event journal settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileJournalConfig {
    /// JSONL file receiving every core event; unset disables the journal
    pub path: Option<String>,
}

impl FileJournalConfig {
    /// Resolved journal path, expanding a leading `~/`
    pub fn resolved_path(&self) -> Option<std::path::PathBuf> {
        let raw = self.path.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(std::path::PathBuf::from(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_defaults() {
        let config = FileGatewayConfig::default();
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.default_model, Model::default());
    }

    #[test]
    fn test_journal_path_resolution() {
        assert!(FileJournalConfig::default().resolved_path().is_none());

        let journal = FileJournalConfig {
            path: Some("/tmp/events.jsonl".into()),
        };
        assert_eq!(
            journal.resolved_path(),
            Some(std::path::PathBuf::from("/tmp/events.jsonl"))
        );
    }
}
