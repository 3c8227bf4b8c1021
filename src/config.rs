//! Agent configuration, read once at startup. No hot reload.

use crate::error::{PortwatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Processes whose name or command line contains one of these are recorded.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "java", "spring", "boot", "node", "express", "mongodb", "mongod", "mysql", "postgres",
    "redis", "python", "flask", "django", "gunicorn", "nginx", "httpd", "php-fpm",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// CSV time series, shared with the query server
    pub store_path: PathBuf,
    /// Collection interval (milliseconds). 0 runs a single cycle and exits.
    pub interval_ms: u64,
    /// Importance keywords (case-insensitive substrings)
    pub keywords: Vec<String>,
    /// Listening socket discovery
    pub sockets: SocketsConfig,
    /// Query server
    pub query: QueryConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketsConfig {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub bind: String,
    /// Range used when a request carries none, e.g. "3d"
    pub default_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("./monitor_log.csv"),
            interval_ms: 10 * 60 * 1000,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            sockets: SocketsConfig::default(),
            query: QueryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SocketsConfig {
    fn default() -> Self {
        Self {
            command: "ss".to_string(),
            args: vec!["-tulpn".to_string()],
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:7777".to_string(),
            default_range: "3d".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl AgentConfig {
    /// Environment variable naming the config file.
    pub const PATH_ENV: &'static str = "PORTWATCH_CONFIG_PATH";

    /// Load from JSON file if present; otherwise return default.
    ///
    /// A file that exists but does not parse is an error; callers decide
    /// whether to fall back.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str::<AgentConfig>(&data).map_err(|e| PortwatchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Path from `PORTWATCH_CONFIG_PATH`, or `portwatch.json`.
    pub fn path_from_env() -> PathBuf {
        std::env::var(Self::PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("portwatch.json"))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let c = AgentConfig::load(Path::new("definitely-not-here.json")).unwrap();
        assert_eq!(c.interval_ms, 600_000);
        assert_eq!(c.store_path, PathBuf::from("./monitor_log.csv"));
        assert!(c.keywords.iter().any(|k| k == "nginx"));
        assert_eq!(c.query.default_range, "3d");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portwatch.json");
        std::fs::write(&path, r#"{"interval_ms": 1000, "keywords": ["caddy"]}"#).unwrap();
        let c = AgentConfig::load(&path).unwrap();
        assert_eq!(c.interval(), Duration::from_secs(1));
        assert_eq!(c.keywords, vec!["caddy".to_string()]);
        assert_eq!(c.sockets.command, "ss");
        assert!(c.log.json);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portwatch.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AgentConfig::load(&path),
            Err(PortwatchError::Config { .. })
        ));
    }
}
