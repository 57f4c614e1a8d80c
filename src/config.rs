//! Planner configuration read from `weft.toml`
//!
//! ```toml
//! legacy_hints = false
//! default_strategy = "forward"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, WeftError};
use crate::planner::Strategy;

/// File name looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "weft.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeftConfig {
    /// Mine extra edges from legacy `dependency_chain` prose
    pub legacy_hints: bool,
    pub default_strategy: Strategy,
}

impl WeftConfig {
    /// Load from an explicit path, or `weft.toml` in `dir` if present.
    ///
    /// A missing default file yields the defaults; a missing explicit path
    /// is an error.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WeftError::io(path, e))?;
        Self::parse(&content).map_err(|message| WeftError::Config {
            path: PathBuf::from(path),
            message,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = WeftConfig::default();
        assert!(!config.legacy_hints);
        assert_eq!(config.default_strategy, Strategy::Forward);
    }

    #[test]
    fn test_parse_full() {
        let config = WeftConfig::parse("legacy_hints = true\ndefault_strategy = \"hybrid\"\n").unwrap();
        assert!(config.legacy_hints);
        assert_eq!(config.default_strategy, Strategy::Hybrid);
    }

    #[test]
    fn test_parse_partial_keeps_defaults() {
        let config = WeftConfig::parse("legacy_hints = true\n").unwrap();
        assert_eq!(config.default_strategy, Strategy::Forward);
    }

    #[test]
    fn test_parse_rejects_unknown_strategy() {
        assert!(WeftConfig::parse("default_strategy = \"sideways\"\n").is_err());
    }

    #[test]
    fn test_load_missing_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = WeftConfig::load(None, temp_dir.path()).unwrap();
        assert_eq!(config, WeftConfig::default());
    }

    #[test]
    fn test_load_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "legacy_hints = true\n").unwrap();
        let config = WeftConfig::load(None, temp_dir.path()).unwrap();
        assert!(config.legacy_hints);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        let err = WeftConfig::load(Some(&missing), temp_dir.path()).unwrap_err();
        assert!(matches!(err, WeftError::Io { .. }));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "legacy_hints = \"yes please\"\n").unwrap();
        let err = WeftConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }
}
