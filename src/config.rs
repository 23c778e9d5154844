//! Server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the JSON file at
//! `<config dir>/molstar-mvsx/config.json`, then `MVSX_*` environment
//! variables. Command-line flags are layered on top by the binary.

use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, DEFAULT_HIGHLIGHT_RESIDUE};
use crate::error::ConfigError;

const APP_NAME: &str = "molstar-mvsx";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_DIR: &str = "testdata";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory scanned for trajectory pairs.
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Residue name drawn as ball-and-stick in trajectory scenes.
    pub highlight_residue: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            highlight_residue: DEFAULT_HIGHLIGHT_RESIDUE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Resolve file and environment settings. Unreadable or malformed
    /// sources are logged and skipped.
    pub fn load() -> Self {
        let base = match config_path().and_then(|path| Self::from_file_or_default(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        };

        match base.clone().with_env(|var| std::env::var(var).ok()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring environment overrides: {}", e);
                base
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Overlay `MVSX_DATA_DIR`, `MVSX_HOST`, `MVSX_PORT` and
    /// `MVSX_HIGHLIGHT_RESIDUE` as returned by `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup("MVSX_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("MVSX_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("MVSX_PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "MVSX_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(residue) = lookup("MVSX_HIGHLIGHT_RESIDUE") {
            self.highlight_residue = residue;
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(&self.data_dir).with_highlight_residue(&self.highlight_residue)
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let mut path = config_dir().ok_or(ConfigError::NoConfigDir)?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.data_dir, PathBuf::from("testdata"));
        assert_eq!(config.highlight_residue, "UNK");
    }

    #[test]
    fn env_overrides_file_values() {
        let config = ServerConfig::default()
            .with_env(env(&[("MVSX_PORT", "9100"), ("MVSX_DATA_DIR", "/srv/md")]))
            .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.data_dir, PathBuf::from("/srv/md"));
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ServerConfig::default()
            .with_env(env(&[("MVSX_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "MVSX_PORT", .. }));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "port": 7001, "highlight_residue": "LIG" }"#).unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 7001);
        assert_eq!(config.highlight_residue, "LIG");
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ port: ").unwrap();

        let err = ServerConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
