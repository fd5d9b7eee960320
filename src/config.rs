use serde::Deserialize;
use std::env;
use std::fs;

use crate::error::{ChatError, Result};

fn default_timeout_secs() -> u64 {
    120
}

fn default_storage_path() -> String {
    "conversations.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub endpoint: EndpointConfig,

    /// Opaque user identifier sent with every request
    pub user: String,

    /// Path of the JSON blob the conversation set is persisted under
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Full URL of the assistant chat endpoint
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let url = env::var("CHAT_ENDPOINT")
            .map_err(|_| ChatError::Config("CHAT_ENDPOINT not set".to_string()))?;

        let timeout_secs = match env::var("CHAT_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| ChatError::Config(format!("Invalid timeout value: {}", e)))?,
            Err(_) => default_timeout_secs(),
        };

        let user = env::var("CHAT_USER").unwrap_or_else(|_| "anonymous".to_string());
        let storage_path = env::var("CHAT_STORAGE_PATH").unwrap_or_else(|_| default_storage_path());

        Ok(ClientConfig {
            endpoint: EndpointConfig { url, timeout_secs },
            user,
            storage_path,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: ClientConfig = toml::from_str(&contents)
            .map_err(|e| ChatError::Config(format!("Failed to parse config file: {}", e)))?;

        // Allow environment variables to override file config
        if let Ok(url) = env::var("CHAT_ENDPOINT") {
            config.endpoint.url = url;
        }
        if let Ok(user) = env::var("CHAT_USER") {
            config.user = user;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.url.is_empty() {
            return Err(ChatError::Config("Endpoint URL is empty".to_string()));
        }

        if !self.endpoint.url.starts_with("http://") && !self.endpoint.url.starts_with("https://") {
            return Err(ChatError::Config(format!(
                "Endpoint URL must be http(s): {}",
                self.endpoint.url
            )));
        }

        if self.endpoint.timeout_secs == 0 {
            return Err(ChatError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.user.is_empty() {
            return Err(ChatError::Config("User is empty".to_string()));
        }

        Ok(())
    }
}
