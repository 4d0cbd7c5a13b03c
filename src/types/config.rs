//! Configuration structures.
//!
//! Resolved once at startup (CLI flags and environment, see `main.rs`) and
//! injected into the adapter. Nothing below reads the environment on its own.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default Sheets API v4 endpoint.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Credential source.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Sheets backend client configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Stdio server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Set the service-account key file.
    pub fn with_service_account_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials.service_account_file = Some(path.into());
        self
    }

    /// Point the backend at a different API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.backend.base_url = base_url.into();
        self
    }
}

/// Credential configuration.
///
/// No default key path. When unset, every tool call reports a credentials error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredentialsConfig {
    /// Path to a Google service-account JSON key.
    pub service_account_file: Option<PathBuf>,
}

/// Sheets backend client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Sheets API base URL (no trailing slash).
    pub base_url: String,

    /// Per-request timeout for API and token calls.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("sheets-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Stdio server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name advertised in the `initialize` handshake.
    pub name: String,

    /// Maximum accepted size of one inbound message line.
    pub max_message_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "sheets-mcp".to_string(),
            max_message_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_credential_path() {
        let config = Config::default();
        assert!(config.credentials.service_account_file.is_none());
        assert_eq!(config.backend.base_url, DEFAULT_SHEETS_BASE_URL);
        assert_eq!(config.backend.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "credentials": { "service_account_file": "/etc/sheets/key.json" },
            "backend": {
                "base_url": "http://127.0.0.1:9000",
                "request_timeout": "5s",
                "user_agent": "test"
            }
        }))
        .unwrap();

        assert_eq!(
            config.credentials.service_account_file,
            Some(PathBuf::from("/etc/sheets/key.json"))
        );
        assert_eq!(config.backend.request_timeout, Duration::from_secs(5));
        assert_eq!(config.server.name, "sheets-mcp");
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_service_account_file("/tmp/key.json")
            .with_base_url("http://localhost:1234");
        assert_eq!(
            config.credentials.service_account_file.as_deref(),
            Some(std::path::Path::new("/tmp/key.json"))
        );
        assert_eq!(config.backend.base_url, "http://localhost:1234");
    }
}
