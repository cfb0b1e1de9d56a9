//! YAPL configuration system
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Explicit --config file
//! 3. User-level (~/.config/yapl/config.toml)
//! 4. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use yapl::util::config::{load_user_config, YaplConfig};
//!
//! let config = load_user_config().unwrap_or_default();
//! assert!(config.lexer.queue_capacity > 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::logger::LogLevel;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct YaplConfig {
    /// REPL settings
    #[serde(default)]
    pub repl: ReplConfig,
    /// Tokenizer settings
    #[serde(default)]
    pub lexer: LexerConfig,
    /// Code generation and execution settings
    #[serde(default)]
    pub jit: JitConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// REPL configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplConfig {
    /// Banner printed before each interactive read
    #[serde(default = "default_banner")]
    pub banner: String,
    /// History file path
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    /// History size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_banner() -> String {
    "(yapl)>>> ".to_string()
}

fn default_history_size() -> usize {
    1000
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            banner: default_banner(),
            history_file: None,
            history_size: default_history_size(),
        }
    }
}

/// Tokenizer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexerConfig {
    /// Run the tokenizer on its own worker thread
    #[serde(default = "default_true")]
    pub threaded: bool,
    /// Bound of the token channel
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            threaded: true,
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OptLevel {
    /// No function passes
    O0,
    /// Constant folding, dead code elimination
    #[default]
    O1,
    /// Constant folding and CFG simplification
    O2,
}

impl std::fmt::Display for OptLevel {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            OptLevel::O0 => write!(f, "O0"),
            OptLevel::O1 => write!(f, "O1"),
            OptLevel::O2 => write!(f, "O2"),
        }
    }
}

impl std::str::FromStr for OptLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "O0" => Ok(OptLevel::O0),
            "1" | "O1" => Ok(OptLevel::O1),
            "2" | "O2" => Ok(OptLevel::O2),
            other => Err(format!("unknown optimization level `{}`", other)),
        }
    }
}

/// Code generation and execution configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JitConfig {
    /// Function pass pipeline
    #[serde(default)]
    pub opt_level: OptLevel,
    /// Log the IR of every committed unit
    #[serde(default)]
    pub print_ir: bool,
    /// Lower `<` as unsigned integer / unordered float compare
    #[serde(default)]
    pub unsigned_compare: bool,
    /// Replace committed function bodies instead of rejecting redefinitions
    #[serde(default)]
    pub allow_redefinition: bool,
    /// Execution engine recursion limit
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

fn default_max_call_depth() -> usize {
    512
}

impl Default for JitConfig {
    fn default() -> Self {
        Self {
            opt_level: OptLevel::default(),
            print_ir: false,
            unsigned_compare: false,
            allow_redefinition: false,
            max_call_depth: default_max_call_depth(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LogConfig {
    /// Minimum level
    #[serde(default)]
    pub level: LogLevel,
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("yapl"));
    }

    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("yapl"));
    }

    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("yapl"));
    }

    None
}

/// Get the user config file path (~/.config/yapl/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<YaplConfig, ConfigError> {
    match get_config_path() {
        Some(path) if path.exists() => load_config_file(&path),
        _ => Ok(YaplConfig::default()),
    }
}

/// Load configuration from an explicit file
pub fn load_config_file(path: &Path) -> Result<YaplConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
    parse_config(&content)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<YaplConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::ParseError)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, YaplConfig::default());
        assert_eq!(config.repl.banner, "(yapl)>>> ");
        assert!(config.lexer.threaded);
        assert_eq!(config.jit.opt_level, OptLevel::O1);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = parse_config(
            r#"
            [jit]
            opt_level = "O2"
            unsigned_compare = true

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.jit.opt_level, OptLevel::O2);
        assert!(config.jit.unsigned_compare);
        assert!(!config.jit.allow_redefinition);
        assert_eq!(config.jit.max_call_depth, 512);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.lexer.queue_capacity, 256);
    }

    #[test]
    fn test_bad_config_is_reported() {
        let err = parse_config("[lexer]\nqueue_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_opt_level_from_str() {
        assert_eq!("2".parse::<OptLevel>().unwrap(), OptLevel::O2);
        assert_eq!("O0".parse::<OptLevel>().unwrap(), OptLevel::O0);
        assert!("fast".parse::<OptLevel>().is_err());
    }
}
