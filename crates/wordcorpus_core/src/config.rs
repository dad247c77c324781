//! Runtime configuration for corpus hosts.
//!
//! # Responsibility
//! - Describe where the corpus lives, how it logs and which uniqueness scope
//!   admission uses.
//! - Load settings from JSON and apply `WORDCORPUS_*` environment overrides.
//!
//! # Invariants
//! - Defaults are usable as-is: in-memory corpus, no file logging,
//!   active-only uniqueness.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{init_logging, LogLevel, LoggingError};
use crate::pipeline::validation::UniquenessScope;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "WORDCORPUS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "WORDCORPUS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WORDCORPUS_LOG_DIR";
pub const ENV_UNIQUENESS_SCOPE: &str = "WORDCORPUS_UNIQUENESS_SCOPE";

/// Host-level settings for opening and operating a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    /// SQLite file; `None` keeps the corpus in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub uniqueness_scope: UniquenessScope,
}

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CorpusConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `WORDCORPUS_*` overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = read(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::parse(&level).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: level,
            })?;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(scope) = read(ENV_UNIQUENESS_SCOPE) {
            self.uniqueness_scope =
                UniquenessScope::parse(&scope).ok_or(ConfigError::InvalidValue {
                    key: ENV_UNIQUENESS_SCOPE,
                    value: scope,
                })?;
        }

        Ok(self)
    }

    /// Starts file logging when `log_dir` is set.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }

    /// Whether words outlive the process, i.e. a database file is configured.
    pub fn is_persistent(&self) -> bool {
        self.db_path.is_some()
    }

    /// Opens the configured corpus database with migrations applied.
    pub fn open_database(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CorpusConfig, ENV_LOG_LEVEL, ENV_UNIQUENESS_SCOPE};
    use crate::logging::LogLevel;
    use crate::pipeline::validation::UniquenessScope;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn defaults_are_in_memory_and_active_only() {
        let config = CorpusConfig::default();
        assert_eq!(config.db_path, None);
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, LogLevel::for_build());
        assert_eq!(config.uniqueness_scope, UniquenessScope::ActiveOnly);
    }

    #[test]
    fn corpus_persists_only_with_db_path() {
        assert!(!CorpusConfig::default().is_persistent());

        let config = CorpusConfig::default()
            .with_overrides(|key| (key == "WORDCORPUS_DB_PATH").then(|| "/tmp/w.db".to_string()))
            .unwrap();
        assert!(config.is_persistent());
    }

    #[test]
    fn json_fields_override_defaults() {
        let config = CorpusConfig::from_json_str(
            r#"{"db_path": "/var/lib/words.db", "log_level": "warning", "uniqueness_scope": "global"}"#,
        )
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/words.db")));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.uniqueness_scope, UniquenessScope::Global);
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let err = CorpusConfig::from_json_str(r#"{"dbpath": "x"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_apply_and_validate() {
        let env: HashMap<&str, &str> = [
            ("WORDCORPUS_DB_PATH", "/tmp/corpus.db"),
            (ENV_LOG_LEVEL, "ERROR"),
            (ENV_UNIQUENESS_SCOPE, "  "),
        ]
        .into_iter()
        .collect();

        let config = CorpusConfig::default()
            .with_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/corpus.db")));
        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(config.uniqueness_scope, UniquenessScope::ActiveOnly);

        let err = CorpusConfig::default()
            .with_overrides(|key| (key == ENV_UNIQUENESS_SCOPE).then(|| "sometimes".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: ENV_UNIQUENESS_SCOPE, ref value } if value == "sometimes"
        ));
    }

    #[test]
    fn without_log_dir_logging_is_skipped() {
        assert!(!CorpusConfig::default().init_logging().unwrap());
    }
}
