//! Workbench configuration
//!
//! ```toml
//! dangling_policy = "reject"
//! language = "hindi"
//!
//! [service]
//! base_url = "https://usr.example.org/api"
//! token = "..."
//! timeout_secs = 30
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with linked entries whose index has no lexical entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Keep silently
    Ignore,
    /// Keep, report and log
    #[default]
    Warn,
    /// Block commit
    Reject,
    /// Remove from the commit payload
    Drop,
}

/// Connection to the external USR service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl ServiceConfig {
    /// Create new service config
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: default_timeout(),
        }
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Workbench configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub dangling_policy: DanglingPolicy,
    pub service: Option<ServiceConfig>,
    /// Concept-search language when the record names none
    pub language: String,
}

impl WorkbenchConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With dangling-reference policy
    #[inline]
    #[must_use]
    pub fn with_dangling_policy(mut self, policy: DanglingPolicy) -> Self {
        self.dangling_policy = policy;
        self
    }

    /// With service connection
    #[inline]
    #[must_use]
    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.service = Some(service);
        self
    }

    /// With search language
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] when the text does not match the schema
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] or [`ConfigError::Parse`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            dangling_policy: DanglingPolicy::default(),
            service: None,
            language: "hindi".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = WorkbenchConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorkbenchConfig::default());
        assert_eq!(config.dangling_policy, DanglingPolicy::Warn);
        assert_eq!(config.language, "hindi");
    }

    #[test]
    fn full_config() {
        let config = WorkbenchConfig::from_toml_str(
            r#"
            dangling_policy = "drop"
            language = "english"

            [service]
            base_url = "http://localhost:5000"
            token = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.dangling_policy, DanglingPolicy::Drop);
        let service = config.service.unwrap();
        assert_eq!(service.token.as_deref(), Some("abc"));
        assert_eq!(service.timeout_secs, 30);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(matches!(
            WorkbenchConfig::from_toml_str("dangling_policy = \"maybe\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dangling_policy = \"reject\"").unwrap();
        let config = WorkbenchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dangling_policy, DanglingPolicy::Reject);

        assert!(matches!(
            WorkbenchConfig::from_file("/nonexistent/usr.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
