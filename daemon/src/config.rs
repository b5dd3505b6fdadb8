//! Daemon configuration with TOML file support.
//!
//! The file is the base; command-line flags and `PROOFPASS_*` environment
//! variables override it field by field.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use proofpass_registry::config::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_MAX_TEXT_LEN};
use proofpass_registry::RegistryConfig;
use proofpass_types::Address;
use proofpass_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("no owner address configured (set `owner`, --owner or PROOFPASS_OWNER)")]
    MissingOwner,
}

/// Configuration for the ProofPass daemon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Registry owner. Required to run; pinned into the database on first start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,

    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Address the RPC server binds to.
    #[serde(default = "default_rpc_bind")]
    pub rpc_bind: SocketAddr,

    /// Front-end origins allowed by CORS. `"*"` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Whether to serve Prometheus metrics on `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Longest accepted free-text field, in characters.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Largest activity log page served.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./proofpass_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_rpc_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7077))
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_text_len() -> usize {
    DEFAULT_MAX_TEXT_LEN
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

/// Values supplied on the command line or through the environment.
/// `None` (or `false`, or empty) leaves the file value in place.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub owner: Option<Address>,
    pub data_dir: Option<PathBuf>,
    pub rpc_bind: Option<SocketAddr>,
    pub rpc_port: Option<u16>,
    pub cors_origins: Vec<String>,
    pub enable_metrics: bool,
    pub log_format: Option<LogFormat>,
    pub log_level: Option<String>,
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(owner) = overrides.owner {
            self.owner = Some(owner);
        }
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(bind) = overrides.rpc_bind {
            self.rpc_bind = bind;
        }
        if let Some(port) = overrides.rpc_port {
            self.rpc_bind.set_port(port);
        }
        if !overrides.cors_origins.is_empty() {
            self.cors_origins = overrides.cors_origins;
        }
        self.enable_metrics |= overrides.enable_metrics;
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    /// The slice of configuration injected into the registry.
    pub fn registry_config(&self) -> Result<RegistryConfig, ConfigError> {
        let owner = self.owner.ok_or(ConfigError::MissingOwner)?;
        Ok(RegistryConfig {
            owner,
            max_text_len: self.max_text_len,
            max_page_size: self.max_page_size,
        })
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            owner: None,
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            rpc_bind: default_rpc_bind(),
            cors_origins: default_cors_origins(),
            enable_metrics: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            max_text_len: default_max_text_len(),
            max_page_size: default_max_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0";

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig {
            owner: Some(Address::parse(OWNER).unwrap()),
            ..DaemonConfig::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_bind.port(), 7077);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.max_page_size, DEFAULT_MAX_PAGE_SIZE);
        assert!(config.owner.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = format!(
            r#"
            owner = "{OWNER}"
            rpc_bind = "0.0.0.0:9000"
            log_format = "json"
            cors_origins = ["https://proofpass.app"]
        "#
        );
        let config = DaemonConfig::from_toml_str(&toml).expect("should parse");
        assert_eq!(config.rpc_bind.port(), 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.cors_origins, vec!["https://proofpass.app"]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn bad_owner_is_parse_error() {
        let err = DaemonConfig::from_toml_str(r#"owner = "0x12""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_returns_read_error() {
        let err = DaemonConfig::from_toml_file(Path::new("/nonexistent/proofpass.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = DaemonConfig::from_toml_str(r#"rpc_bind = "0.0.0.0:9000""#).unwrap();
        config.apply(Overrides {
            owner: Some(Address::parse(OWNER).unwrap()),
            rpc_port: Some(8080),
            enable_metrics: true,
            log_level: Some("debug".into()),
            ..Overrides::default()
        });
        assert_eq!(config.rpc_bind, "0.0.0.0:8080".parse().unwrap());
        assert!(config.enable_metrics);
        assert_eq!(config.log_level, "debug");
        // Untouched fields keep their file or default values.
        assert_eq!(config.cors_origins, default_cors_origins());
    }

    #[test]
    fn registry_config_requires_owner() {
        let config = DaemonConfig::default();
        assert!(matches!(
            config.registry_config(),
            Err(ConfigError::MissingOwner)
        ));

        let config = DaemonConfig {
            owner: Some(Address::parse(OWNER).unwrap()),
            max_page_size: 50,
            ..DaemonConfig::default()
        };
        let registry = config.registry_config().unwrap();
        assert_eq!(registry.max_page_size, 50);
        assert_eq!(registry.max_text_len, DEFAULT_MAX_TEXT_LEN);
    }
}
