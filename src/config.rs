//! Runtime configuration: evaluation limits and REPL settings.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the plain language semantics.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::interp::Limits;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Operand bounds for `!` and `^`.
    #[serde(default)]
    pub limits: Limits,
    /// Interactive loop settings.
    #[serde(default)]
    pub repl: ReplConfig,
}

/// REPL configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplConfig {
    /// Prompt printed before each line.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Where to persist line history; no persistence when absent.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

/// Failure to load a config file
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {}", .path.display())]
    #[diagnostic(code(config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}", .path.display())]
    #[diagnostic(code(config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            history_file: None,
        }
    }
}

fn default_prompt() -> String {
    "> ".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.limits.max_exponent, u32::MAX);
        assert_eq!(config.repl.prompt, "> ");
    }

    #[test]
    fn test_partial_limits() {
        let config: Config = toml::from_str(
            r#"
            [limits]
            max_factorial = 500

            [repl]
            history_file = "/tmp/tally_history"
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_factorial, 500);
        assert_eq!(config.limits.max_exponent, u32::MAX);
        assert_eq!(
            config.repl.history_file,
            Some(PathBuf::from("/tmp/tally_history"))
        );
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/tally.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
