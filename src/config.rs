//! Settings loaded from YAML
//!
//! Everything has a default, so an empty file (or no file) is valid.

use crate::error::{Error, Result};
use crate::http::{ExecutorConfig, RateLimiterConfig};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::types::ServerPath;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Settings
// ============================================================================

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Server used when no account or `--server` is given
    #[serde(default = "ServerPath::gitee")]
    pub server: ServerPath,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Items requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Where the account list is persisted
    #[serde(default)]
    pub accounts_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerPath::gitee(),
            http: HttpSettings::default(),
            page_size: default_page_size(),
            accounts_file: None,
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Whole-request timeout in seconds, none by default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Client-side rate limit, off by default
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
            rate_limit: None,
        }
    }
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("prforge/{}", env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// Loading
// ============================================================================

impl Settings {
    /// Read settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read settings '{}': {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Read settings from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(Error::missing_field("server.host"));
        }
        if self.page_size == 0 {
            return Err(Error::config("page_size must be at least 1"));
        }
        if let Some(limit) = &self.http.rate_limit {
            if limit.requests_per_second == 0 {
                return Err(Error::config(
                    "http.rate_limit.requests_per_second must be at least 1",
                ));
            }
        }
        Ok(())
    }

    /// Executor configuration built from the HTTP settings
    pub fn to_executor_config(&self) -> ExecutorConfig {
        let mut builder = ExecutorConfig::builder()
            .connect_timeout(Duration::from_secs(self.http.connect_timeout_seconds))
            .user_agent(self.http.user_agent.clone());
        if let Some(timeout) = self.http.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        if let Some(limit) = self.http.rate_limit {
            builder = builder.rate_limit(limit);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_settings_are_defaults() {
        let settings = Settings::from_yaml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server, ServerPath::gitee());
        assert_eq!(settings.page_size, 100);
        assert_eq!(settings.http.connect_timeout_seconds, 5);
        assert!(settings.http.user_agent.starts_with("prforge/"));
    }

    #[test]
    fn test_parse_settings() {
        let yaml = r#"
server:
  host: ghe.example.com
  suffix: /git
page_size: 50
accounts_file: /tmp/accounts.json
http:
  timeout_seconds: 30
  rate_limit:
    requests_per_second: 10
"#;

        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.server.host, "ghe.example.com");
        assert_eq!(settings.page_size, 50);
        assert_eq!(
            settings.accounts_file,
            Some(PathBuf::from("/tmp/accounts.json"))
        );
        assert_eq!(settings.http.rate_limit, Some(RateLimiterConfig::new(10, 5)));

        let config = settings.to_executor_config();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(10, 5)));
    }

    #[test]
    fn test_server_host_case_is_normalised() {
        let settings = Settings::from_yaml_str("server:\n  host: GitHub.com\n").unwrap();
        assert_eq!(settings.server, ServerPath::github());
        assert_eq!(settings.server.api_url(), "https://api.github.com");
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            Settings::from_yaml_str("page_size: 0"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            Settings::from_yaml_str("server:\n  host: ''"),
            Err(Error::MissingConfigField { .. })
        ));
        assert!(matches!(
            Settings::from_yaml_str("page_size: [1"),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size: 20").unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.page_size, 20);

        let missing = Settings::load("/nonexistent/prforge.yaml");
        assert!(matches!(missing, Err(Error::Config { .. })));
        assert_eq!(Settings::load_or_default(None).unwrap(), Settings::default());
    }
}
