//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use spectacle_types::{ContainerVersion, TagConfig};
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Warehouse log store settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Container mode, consulted by the `debug` console log policy.
    #[serde(default)]
    pub container: ContainerVersion,

    /// Defaults for blank fields of inbound tag configurations.
    #[serde(default)]
    pub tag: TagDefaults,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "spectacle_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Tag fields filled in when an invocation leaves them blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TagDefaults {
    pub workspace_id: Option<String>,
    pub base_url: Option<String>,
    pub cookie_domain: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl TagDefaults {
    /// Fills blank fields of `tag` from these defaults.
    pub fn apply(&self, mut tag: TagConfig) -> TagConfig {
        if tag.workspace_id.is_empty() {
            if let Some(workspace_id) = &self.workspace_id {
                tag.workspace_id = workspace_id.clone();
            }
        }
        if tag.base_url.is_empty() {
            if let Some(base_url) = &self.base_url {
                tag.base_url = base_url.clone();
            }
        }
        if tag.cookie_domain.as_deref().map_or(true, str::is_empty) {
            tag.cookie_domain = self.cookie_domain.clone();
        }
        if tag.request_timeout_ms.is_none() {
            tag.request_timeout_ms = self.request_timeout_ms;
        }
        tag
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "spectacle.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SPECTACLE_HOST` overrides `server.host`
/// - `SPECTACLE_PORT` overrides `server.port`
/// - `SPECTACLE_DB_PATH` overrides `database.path`
/// - `SPECTACLE_LOG_LEVEL` overrides `logging.level`
/// - `SPECTACLE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `SPECTACLE_DEBUG_MODE` / `SPECTACLE_PREVIEW_MODE` override `container.*`
/// - `SPECTACLE_WORKSPACE_ID`, `SPECTACLE_BASE_URL` and
///   `SPECTACLE_COOKIE_DOMAIN` override the `tag` defaults
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("SPECTACLE_HOST").and_then(|v| v.parse().ok()) {
        config.server.host = host;
    }
    if let Some(port) = var("SPECTACLE_PORT").and_then(|v| v.parse().ok()) {
        config.server.port = port;
    }
    if let Some(db_path) = var("SPECTACLE_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("SPECTACLE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("SPECTACLE_LOG_JSON") {
        config.logging.json = is_enabled(&json);
    }
    if let Some(debug) = var("SPECTACLE_DEBUG_MODE") {
        config.container.debug_mode = is_enabled(&debug);
    }
    if let Some(preview) = var("SPECTACLE_PREVIEW_MODE") {
        config.container.preview_mode = is_enabled(&preview);
    }
    if let Some(workspace_id) = var("SPECTACLE_WORKSPACE_ID") {
        config.tag.workspace_id = Some(workspace_id);
    }
    if let Some(base_url) = var("SPECTACLE_BASE_URL") {
        config.tag.base_url = Some(base_url);
    }
    if let Some(cookie_domain) = var("SPECTACLE_COOKIE_DOMAIN") {
        config.tag.cookie_domain = Some(cookie_domain);
    }
}

fn is_enabled(value: &str) -> bool {
    value == "true" || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "spectacle.db");
        assert_eq!(config.database.pool_max_size, 4);
        assert!(!config.container.is_debug());
    }

    #[test]
    fn parses_all_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 9000

[database]
path = "/var/lib/spectacle/logs.db"

[logging]
level = "debug"
json = true

[container]
preview_mode = true

[tag]
workspace_id = "ws_default"
base_url = "https://collect.example.com"
"#
        )
        .unwrap();

        let config = load_config(file.path().to_str()).unwrap();

        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, "/var/lib/spectacle/logs.db");
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.logging.json);
        assert!(config.container.is_debug());
        assert_eq!(config.tag.workspace_id.as_deref(), Some("ws_default"));
        assert_eq!(config.tag.cookie_domain, None);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nport = ").unwrap();

        assert!(matches!(
            load_config(file.path().to_str()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("SPECTACLE_PORT", "7000"),
            ("SPECTACLE_HOST", "not-an-ip"),
            ("SPECTACLE_LOG_JSON", "1"),
            ("SPECTACLE_DEBUG_MODE", "true"),
            ("SPECTACLE_BASE_URL", "https://edge.example.com"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();

        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, default_host());
        assert!(config.logging.json);
        assert!(config.container.debug_mode);
        assert_eq!(
            config.tag.base_url.as_deref(),
            Some("https://edge.example.com")
        );
    }

    #[test]
    fn tag_defaults_fill_blanks_only() {
        let defaults = TagDefaults {
            workspace_id: Some("ws_default".to_string()),
            base_url: Some("https://collect.example.com".to_string()),
            cookie_domain: Some("example.com".to_string()),
            request_timeout_ms: Some(2_000),
        };
        let tag = TagConfig {
            workspace_id: "ws_explicit".to_string(),
            cookie_domain: Some(String::new()),
            ..TagConfig::default()
        };

        let tag = defaults.apply(tag);

        assert_eq!(tag.workspace_id, "ws_explicit");
        assert_eq!(tag.base_url, "https://collect.example.com");
        assert_eq!(tag.cookie_domain.as_deref(), Some("example.com"));
        assert_eq!(tag.request_timeout_ms, Some(2_000));
    }
}
