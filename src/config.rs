// ABOUTME: Connection and client configuration for the SCADA-LTS adapter
// ABOUTME: Defines ConnectionConfig, ClientConfig, environment defaults, and optional TOML file loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::types::ScadaError;

/// Default timeout for every upstream HTTP call (30 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the default base URL
pub const BASE_URL_ENV: &str = "SCADA_LTS_BASE_URL";

/// Environment variable holding the default username
pub const USERNAME_ENV: &str = "SCADA_LTS_USERNAME";

/// Environment variable holding the default password
pub const PASSWORD_ENV: &str = "SCADA_LTS_PASSWORD";

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "SCADA_LTS_TIMEOUT_SECS";

/// Where and as whom to connect to a SCADA-LTS instance
///
/// Immutable once handed to the session manager. Replacing it is the only way
/// to change the target, and doing so discards any cached token.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ConnectionConfig {
    /// Create a configuration for the given base URL with no credentials
    ///
    /// The URL must be absolute `http` or `https`; a trailing slash is dropped.
    pub fn new(base_url: &str) -> Result<Self, ScadaError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ScadaError::validation("base_url must not be empty"));
        }

        let parsed = Url::parse(trimmed)
            .map_err(|e| ScadaError::validation(format!("Invalid base_url '{trimmed}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScadaError::validation(format!(
                "base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: trimmed.to_owned(),
            username: None,
            password: None,
        })
    }

    /// Set the credentials; empty strings count as absent
    #[must_use]
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username.filter(|u| !u.is_empty());
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured username, if any
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Configured password, if any
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Whether both a username and a password are present
    pub const fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Read the startup default from `SCADA_LTS_BASE_URL` and friends
    ///
    /// Returns `Ok(None)` when no base URL is set in the environment.
    pub fn from_env() -> Result<Option<Self>, ScadaError> {
        let Some(base_url) = env_non_empty(BASE_URL_ENV) else {
            return Ok(None);
        };
        let config = Self::new(&base_url)?
            .with_credentials(env_non_empty(USERNAME_ENV), env_non_empty(PASSWORD_ENV));
        Ok(Some(config))
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings for the HTTP client shared by all upstream calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum time to wait for any single upstream request
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from `SCADA_LTS_TIMEOUT_SECS`, falling back to the default
    pub fn from_env() -> Result<Self, ScadaError> {
        match env_non_empty(TIMEOUT_ENV) {
            Some(raw) => {
                let timeout = parse_timeout(&raw).map_err(|e| {
                    ScadaError::validation(format!("Invalid {TIMEOUT_ENV} '{raw}': {}", e.message))
                })?;
                Ok(Self::default().with_timeout(timeout))
            }
            None => Ok(Self::default()),
        }
    }
}

/// Parse a timeout value from a string (in seconds)
///
/// # Errors
///
/// Returns a validation error if the string is not a positive integer.
pub fn parse_timeout(input: &str) -> Result<Duration, ScadaError> {
    let secs = input
        .trim()
        .parse::<u64>()
        .map_err(|e| ScadaError::validation(format!("not a whole number of seconds: {e}")))?;
    timeout_from_secs(secs)
}

/// Timeout of `secs` seconds; zero would fail every request immediately
pub fn timeout_from_secs(secs: u64) -> Result<Duration, ScadaError> {
    if secs == 0 {
        return Err(ScadaError::validation("timeout must be at least 1 second"));
    }
    Ok(Duration::from_secs(secs))
}

/// Value of an environment variable, treating blank as unset
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Config File (feature = "config-file")
// ============================================================================

/// Contents of `config.toml`
#[cfg(feature = "config-file")]
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct FileConfig {
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Default connection
    pub connection: Option<FileConnection>,
}

/// `[connection]` table of `config.toml`
#[cfg(feature = "config-file")]
#[derive(Clone, Default, serde::Deserialize)]
pub struct FileConnection {
    /// Base URL of the SCADA-LTS instance
    pub base_url: String,
    /// Username for login
    pub username: Option<String>,
    /// Password for login
    pub password: Option<String>,
}

#[cfg(feature = "config-file")]
impl fmt::Debug for FileConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileConnection")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "config-file")]
impl FileConfig {
    /// Default location: `<config_dir>/scada-lts/config.toml`
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scada-lts").join("config.toml"))
    }

    /// Load and parse a config file
    pub fn load(path: &std::path::Path) -> Result<Self, ScadaError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScadaError::internal(format!("Failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|e| {
            ScadaError::validation(format!("Invalid config file {}: {e}", path.display()))
        })
    }

    /// Load the file at the default location, if it exists
    pub fn load_default() -> Result<Option<Self>, ScadaError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).map(Some),
            _ => Ok(None),
        }
    }

    /// Connection described by the file, if any
    pub fn connection_config(&self) -> Result<Option<ConnectionConfig>, ScadaError> {
        self.connection
            .as_ref()
            .map(|c| {
                ConnectionConfig::new(&c.base_url)
                    .map(|cfg| cfg.with_credentials(c.username.clone(), c.password.clone()))
            })
            .transpose()
    }

    /// Client settings described by the file
    pub fn client_config(&self) -> Result<ClientConfig, ScadaError> {
        match self.timeout_secs {
            Some(secs) => Ok(ClientConfig::default().with_timeout(timeout_from_secs(secs)?)),
            None => Ok(ClientConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let cfg = ConnectionConfig::new("http://host:8080/Scada-LTS/").expect("valid");
        assert_eq!(cfg.base_url(), "http://host:8080/Scada-LTS");
    }

    #[test]
    fn rejects_non_http_and_garbage() {
        assert!(ConnectionConfig::new("").is_err());
        assert!(ConnectionConfig::new("not a url").is_err());
        let err = ConnectionConfig::new("ftp://host/").unwrap_err();
        assert!(err.message.contains("http or https"));
    }

    #[test]
    fn empty_credentials_are_absent() {
        let cfg = ConnectionConfig::new("http://host")
            .expect("valid")
            .with_credentials(Some(String::new()), Some("secret".to_owned()));
        assert!(cfg.username().is_none());
        assert!(!cfg.has_credentials());
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = ConnectionConfig::new("http://host")
            .expect("valid")
            .with_credentials(Some("admin".to_owned()), Some("hunter2".to_owned()));
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn parse_timeout_trims() {
        assert_eq!(parse_timeout(" 5 ").expect("parse"), Duration::from_secs(5));
        assert!(parse_timeout("five").is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = parse_timeout("0").unwrap_err();
        assert_eq!(err.kind, crate::types::ErrorKind::Validation);
        assert!(timeout_from_secs(0).is_err());
        assert_eq!(timeout_from_secs(1).expect("timeout"), Duration::from_secs(1));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn file_config_round_trip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "timeout_secs = 7\n[connection]\nbase_url = \"http://plant:8080/Scada-LTS\"\nusername = \"admin\"\npassword = \"admin\""
        )
        .expect("write");

        let loaded = FileConfig::load(file.path()).expect("load");
        assert_eq!(loaded.client_config().expect("client config").timeout, Duration::from_secs(7));
        let conn = loaded.connection_config().expect("valid").expect("present");
        assert_eq!(conn.base_url(), "http://plant:8080/Scada-LTS");
        assert!(conn.has_credentials());
    }
}
