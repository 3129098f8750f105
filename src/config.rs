//! Viewer Configuration
//!
//! Connection settings for the authoritative store plus the display-asset
//! template. Both store values are required: a missing endpoint or key is
//! a fatal configuration error that blocks the whole view at startup,
//! never a silent no-op.

use crate::core::tier::DEFAULT_ICON_URL_TEMPLATE;

/// Environment variable holding the store endpoint.
pub const ENV_STORE_URL: &str = "ROSTER_STORE_URL";

/// Environment variable holding the store access key.
pub const ENV_STORE_KEY: &str = "ROSTER_STORE_KEY";

/// Environment variable overriding the tier-icon URL template.
pub const ENV_ICON_URL_TEMPLATE: &str = "ROSTER_ICON_URL_TEMPLATE";

/// Configuration for one board view.
#[derive(Clone, Debug)]
pub struct BoardConfig {
    /// Store endpoint. Required.
    pub store_url: String,
    /// Store access key. Required.
    pub store_key: String,
    /// Tier-icon URL template; `{id}` is replaced with the tier id.
    pub icon_url_template: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            store_key: String::new(),
            icon_url_template: DEFAULT_ICON_URL_TEMPLATE.to_string(),
        }
    }
}

impl BoardConfig {
    /// Read configuration from environment variables.
    ///
    /// Missing required values come back empty and fail
    /// [`Self::validate`] later; the error surfaces at view startup, not
    /// here.
    pub fn from_env() -> Self {
        Self {
            store_url: std::env::var(ENV_STORE_URL).unwrap_or_default(),
            store_key: std::env::var(ENV_STORE_KEY).unwrap_or_default(),
            icon_url_template: std::env::var(ENV_ICON_URL_TEMPLATE)
                .unwrap_or_else(|_| DEFAULT_ICON_URL_TEMPLATE.to_string()),
        }
    }

    /// Check that the required store connection values are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_url.trim().is_empty() {
            return Err(ConfigError::MissingStoreUrl);
        }
        if self.store_key.trim().is_empty() {
            return Err(ConfigError::MissingStoreKey);
        }
        Ok(())
    }

    /// Whether the required values are present.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Fatal configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The store endpoint is missing.
    #[error("store endpoint is not configured (set ROSTER_STORE_URL)")]
    MissingStoreUrl,

    /// The store access key is missing.
    #[error("store access key is not configured (set ROSTER_STORE_KEY)")]
    MissingStoreKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> BoardConfig {
        BoardConfig {
            store_url: "https://store.example".into(),
            store_key: "anon-key".into(),
            ..BoardConfig::default()
        }
    }

    #[test]
    fn test_validate_complete() {
        assert!(complete().validate().is_ok());
        assert!(complete().is_complete());
    }

    #[test]
    fn test_missing_url() {
        let config = BoardConfig {
            store_url: String::new(),
            ..complete()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingStoreUrl));
    }

    #[test]
    fn test_missing_key() {
        let config = BoardConfig {
            store_key: "   ".into(),
            ..complete()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingStoreKey));
    }

    #[test]
    fn test_from_env_defaults() {
        // Keep this the only test touching these variables; tests share
        // one process environment.
        std::env::set_var(ENV_STORE_URL, "https://store.example");
        std::env::set_var(ENV_STORE_KEY, "anon-key");
        std::env::remove_var(ENV_ICON_URL_TEMPLATE);

        let config = BoardConfig::from_env();
        assert_eq!(config.store_url, "https://store.example");
        assert_eq!(config.store_key, "anon-key");
        assert_eq!(config.icon_url_template, DEFAULT_ICON_URL_TEMPLATE);
    }
}
