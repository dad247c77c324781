//! Core domain logic for the word corpus.
//! This crate is the single source of truth for word admission rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CorpusConfig};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::word::{EntryStatus, WordEntry, WordField, WordId, WordRecord, WordRecordError};
pub use pipeline::processor::{ProcessError, WordEntryProcessor};
pub use pipeline::proper_noun::classify_proper_noun;
pub use pipeline::signature::derive_signature;
pub use pipeline::validation::{
    validate_entry, UniquenessCheck, UniquenessScope, ValidationErrors, Violation,
    NAME_MAX_CHARS, NAME_MIN_CHARS,
};
pub use repo::word_repo::{
    RepoError, RepoResult, SqliteWordRepository, WordListQuery, WordRepository,
};
pub use service::word_service::{WordService, WordServiceError, WordServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
