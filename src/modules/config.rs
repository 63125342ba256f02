use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::modules::encryption::keys::rounds_in_range;
use crate::{
    DEFAULT_HASH_ITERATIONS, DEFAULT_RESET_BASE_URL, DEFAULT_RESET_PAGE, MAX_HASH_ITERATIONS,
    RESET_TOKENS_KEY, RESET_TOKEN_DURATION, SESSION_KEY, USERS_KEY,
};

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid reset URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the account directory. Every field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Persistent key holding the JSON array of user records
    pub users_key: String,
    /// Persistent key holding the JSON object of reset tokens
    pub reset_tokens_key: String,
    /// Ephemeral key holding the current session
    pub session_key: String,
    /// Reset token lifetime, at most one hour
    pub reset_token_ttl_secs: u64,
    /// Base the reset page is resolved against; a trailing path segment
    /// without a slash is replaced by `reset_page`
    pub reset_base_url: String,
    pub reset_page: String,
    /// PBKDF2 rounds for newly hashed passwords, at most `MAX_HASH_ITERATIONS`
    pub hash_iterations: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            users_key: USERS_KEY.to_string(),
            reset_tokens_key: RESET_TOKENS_KEY.to_string(),
            session_key: SESSION_KEY.to_string(),
            reset_token_ttl_secs: RESET_TOKEN_DURATION,
            reset_base_url: DEFAULT_RESET_BASE_URL.to_string(),
            reset_page: DEFAULT_RESET_PAGE.to_string(),
            hash_iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check the settings hang together
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, key) in [
            ("users_key", &self.users_key),
            ("reset_tokens_key", &self.reset_tokens_key),
            ("session_key", &self.session_key),
        ] {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }
        if self.users_key == self.reset_tokens_key {
            return Err(ConfigError::Invalid(
                "users_key and reset_tokens_key must differ".to_string(),
            ));
        }
        if self.reset_token_ttl_secs == 0 || self.reset_token_ttl_secs > RESET_TOKEN_DURATION {
            return Err(ConfigError::Invalid(format!(
                "reset_token_ttl_secs must be between 1 and {}",
                RESET_TOKEN_DURATION
            )));
        }
        if !rounds_in_range(self.hash_iterations) {
            return Err(ConfigError::Invalid(format!(
                "hash_iterations must lie in 1..={}",
                MAX_HASH_ITERATIONS
            )));
        }
        self.reset_page_url().map(|_| ())
    }

    /// Absolute URL of the reset page, without a query
    pub fn reset_page_url(&self) -> Result<Url, ConfigError> {
        let invalid = |source| ConfigError::InvalidUrl {
            url: self.reset_base_url.clone(),
            source,
        };
        let base = Url::parse(&self.reset_base_url).map_err(invalid)?;
        let mut page = base.join(&self.reset_page).map_err(invalid)?;
        page.set_query(None);
        page.set_fragment(None);
        Ok(page)
    }
}
