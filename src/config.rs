//! Server configuration (ambient concern; supplements spec section 6's bare
//! constants with an optional TOML override file), loaded with `serde` +
//! `toml` the way the teacher's manifest already declares those two crates.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::wire::{INDEX_FILE, SYNC_DIR, TCP_PORT};

/// Server-side runtime configuration. Every field falls back to the spec
/// section 6 constant when absent from the config file (or when no config
/// file is given at all).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tcp_port: u16,
    pub sync_dir: PathBuf,
    pub index_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_port: TCP_PORT,
            sync_dir: PathBuf::from(SYNC_DIR),
            index_file: PathBuf::from(INDEX_FILE),
        }
    }
}

impl Config {
    /// Parses a TOML config file from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// The configured index file path, as-is (relative paths resolve against
    /// the process's current directory, matching `sync_dir`'s own handling).
    pub fn index_path(&self) -> PathBuf {
        self.index_file.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_wire_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.tcp_port, TCP_PORT);
        assert_eq!(cfg.sync_dir, PathBuf::from(SYNC_DIR));
        assert_eq!(cfg.index_file, PathBuf::from(INDEX_FILE));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltasyncd.toml");
        std::fs::write(&path, "tcp_port = 9100\n").unwrap();
        let cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.tcp_port, 9100);
        assert_eq!(cfg.sync_dir, PathBuf::from(SYNC_DIR));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::from_file("/nonexistent/deltasyncd.toml").is_err());
    }
}
