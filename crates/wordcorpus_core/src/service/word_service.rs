//! Word use-case service.
//!
//! # Responsibility
//! - Admit new words through the derive/classify/validate pipeline.
//! - Rename, soft-delete and restore existing entries.
//!
//! # Invariants
//! - Nothing reaches the repository without passing `WordEntryProcessor`.
//! - Storage uniqueness races surface as the same rejection shape as the
//!   pipeline's own uniqueness violation.
//! - Log events carry IDs and violation codes only, never word text.

use crate::model::word::{WordEntry, WordField, WordId};
use crate::pipeline::processor::{ProcessError, WordEntryProcessor};
use crate::pipeline::validation::{UniquenessScope, ValidationErrors, Violation};
use crate::repo::word_repo::{RepoError, WordListQuery, WordRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type WordServiceResult<T> = Result<T, WordServiceError>;

/// Service error for word use-cases.
#[derive(Debug)]
pub enum WordServiceError {
    /// Entry failed validation; carries every violation.
    Rejected(ValidationErrors),
    /// Target word does not exist.
    NotFound(WordId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for WordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(errors) => write!(f, "word rejected: {errors}"),
            Self::NotFound(id) => write!(f, "word not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(errors) => Some(errors),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for WordServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(errors) => Self::Rejected(errors),
            RepoError::DuplicateName(_) => Self::Rejected(duplicate_name_errors()),
            other => Self::Repo(other),
        }
    }
}

impl From<ProcessError<RepoError>> for WordServiceError {
    fn from(value: ProcessError<RepoError>) -> Self {
        match value {
            ProcessError::Rejected(errors) => Self::Rejected(errors),
            ProcessError::Lookup(err) => err.into(),
        }
    }
}

/// Use-case service wrapper for word admission and lifecycle.
pub struct WordService<R: WordRepository> {
    repo: R,
    processor: WordEntryProcessor,
}

impl<R: WordRepository> WordService<R> {
    /// Creates a service with active-only uniqueness.
    pub fn new(repo: R) -> Self {
        Self::with_scope(repo, UniquenessScope::default())
    }

    pub fn with_scope(repo: R, scope: UniquenessScope) -> Self {
        Self {
            repo,
            processor: WordEntryProcessor::new(scope),
        }
    }

    /// Derives, validates and persists a new word.
    ///
    /// Returns the stored entry with storage timestamps populated.
    pub fn add_word(&self, name: impl Into<String>) -> WordServiceResult<WordEntry> {
        let entry = self
            .processor
            .process(name, &self.repo)
            .inspect_err(|err| log_rejection("word_create", None, err))?;

        let id = self.repo.create_word(&entry).inspect_err(|err| {
            warn!(
                "event=word_create module=service status=error word_id={} error={err}",
                entry.id()
            );
        })?;

        info!(
            "event=word_create module=service status=ok word_id={id} proper_noun={}",
            entry.proper_noun()
        );
        self.load(id)
    }

    /// Replaces the name of an active word, re-deriving its signature and
    /// classification.
    pub fn rename_word(
        &self,
        id: WordId,
        name: impl Into<String>,
    ) -> WordServiceResult<WordEntry> {
        let mut entry = self
            .repo
            .get_word(id, false)?
            .ok_or(WordServiceError::NotFound(id))?;
        entry.set_name(name);

        let entry = self
            .processor
            .admit(entry, &self.repo)
            .inspect_err(|err| log_rejection("word_rename", Some(id), err))?;
        self.repo.update_word(&entry)?;

        info!("event=word_rename module=service status=ok word_id={id}");
        self.load(id)
    }

    pub fn get_word(
        &self,
        id: WordId,
        include_deleted: bool,
    ) -> WordServiceResult<Option<WordEntry>> {
        Ok(self.repo.get_word(id, include_deleted)?)
    }

    pub fn find_by_name(
        &self,
        name: &str,
        include_deleted: bool,
    ) -> WordServiceResult<Vec<WordEntry>> {
        Ok(self.repo.find_by_name(name, include_deleted)?)
    }

    pub fn list_words(&self, query: &WordListQuery) -> WordServiceResult<Vec<WordEntry>> {
        Ok(self.repo.list_words(query)?)
    }

    /// Soft-deletes a word. Deleting twice is a no-op.
    pub fn delete_word(&self, id: WordId) -> WordServiceResult<()> {
        self.repo.soft_delete_word(id)?;
        info!("event=word_delete module=service status=ok word_id={id}");
        Ok(())
    }

    /// Clears the soft-delete marker of a word.
    ///
    /// Fails with a uniqueness rejection when another active entry has taken
    /// the name in the meantime.
    pub fn restore_word(&self, id: WordId) -> WordServiceResult<WordEntry> {
        self.repo.restore_word(id).inspect_err(|err| {
            warn!("event=word_restore module=service status=error word_id={id} error={err}");
        })?;
        info!("event=word_restore module=service status=ok word_id={id}");
        self.load(id)
    }

    fn load(&self, id: WordId) -> WordServiceResult<WordEntry> {
        self.repo
            .get_word(id, true)?
            .ok_or(WordServiceError::NotFound(id))
    }
}

fn duplicate_name_errors() -> ValidationErrors {
    ValidationErrors::single(Violation::Uniqueness {
        field: WordField::Name,
    })
}

fn log_rejection(event: &str, id: Option<WordId>, err: &ProcessError<RepoError>) {
    let word_id = id.map_or_else(|| "new".to_string(), |id| id.to_string());
    match err {
        ProcessError::Rejected(errors) => info!(
            "event={event} module=service status=rejected word_id={word_id} violations={}",
            errors.summary()
        ),
        ProcessError::Lookup(lookup) => warn!(
            "event={event} module=service status=error word_id={word_id} error_code=uniqueness_lookup_failed error={lookup}"
        ),
    }
}
