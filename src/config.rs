//! Environment-driven configuration

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Base URL of the answering service when none is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Transport timeout for one chat request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid FERRY_CHAT_API_URL {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

/// Runtime configuration for the chat client
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_base_url: String,
    pub db_path: PathBuf,
    /// Identifies the session whose slots are read and written
    pub session_id: String,
    pub request_timeout: Duration,
    /// Keep the session in memory only
    pub ephemeral: bool,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("FERRY_CHAT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if let Err(e) = reqwest::Url::parse(&api_base_url) {
            return Err(ConfigError::InvalidApiUrl {
                url: api_base_url,
                reason: e.to_string(),
            });
        }

        let db_path = lookup("FERRY_CHAT_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.ferry-chat/sessions.db"))
            },
            PathBuf::from,
        );

        let session_id = lookup("FERRY_CHAT_SESSION_ID")
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let request_timeout = lookup("FERRY_CHAT_TIMEOUT_SECS")
            .and_then(|secs| secs.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        let ephemeral = lookup("FERRY_CHAT_EPHEMERAL")
            .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));

        Ok(Self {
            api_base_url,
            db_path,
            session_id,
            request_timeout,
            ephemeral,
        })
    }
}
