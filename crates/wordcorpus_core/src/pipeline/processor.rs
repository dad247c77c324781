//! Word entry admission processor.
//!
//! # Responsibility
//! - Run derive -> classify -> validate as one total, ordered pipeline.
//! - Hand back either an accepted entry or the full violation list.
//!
//! # Invariants
//! - No partially derived entry is observable outside this module.
//! - Accepted entries satisfy every field rule and were unique in scope at
//!   lookup time.

use crate::model::word::WordEntry;
use crate::pipeline::validation::{
    validate_entry, UniquenessCheck, UniquenessScope, ValidationErrors,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of one admission attempt.
#[derive(Debug)]
pub enum ProcessError<E> {
    /// Entry broke one or more validation rules.
    Rejected(ValidationErrors),
    /// Corpus lookup for the uniqueness rule failed.
    Lookup(E),
}

impl<E> ProcessError<E> {
    pub fn rejected(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Rejected(errors) => Some(errors),
            Self::Lookup(_) => None,
        }
    }
}

impl<E: Display> Display for ProcessError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(errors) => write!(f, "word rejected: {errors}"),
            Self::Lookup(err) => write!(f, "uniqueness lookup failed: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for ProcessError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(errors) => Some(errors),
            Self::Lookup(err) => Some(err),
        }
    }
}

/// Pure admission pipeline for candidate word entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordEntryProcessor {
    scope: UniquenessScope,
}

impl WordEntryProcessor {
    pub fn new(scope: UniquenessScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> UniquenessScope {
        self.scope
    }

    /// Builds a candidate entry from a raw name with both derived fields set.
    pub fn prepare(&self, name: impl Into<String>) -> WordEntry {
        WordEntry::new(name)
    }

    /// Derives and validates a new entry for `name`.
    ///
    /// # Errors
    /// - `ProcessError::Rejected` with every violated rule.
    /// - `ProcessError::Lookup` when the corpus cannot be queried.
    pub fn process<C>(
        &self,
        name: impl Into<String>,
        corpus: &C,
    ) -> Result<WordEntry, ProcessError<C::Error>>
    where
        C: UniquenessCheck + ?Sized,
    {
        self.admit(self.prepare(name), corpus)
    }

    /// Validates an already derived entry, e.g. after `WordEntry::set_name`.
    ///
    /// The entry's own ID is excluded from the uniqueness lookup.
    pub fn admit<C>(
        &self,
        entry: WordEntry,
        corpus: &C,
    ) -> Result<WordEntry, ProcessError<C::Error>>
    where
        C: UniquenessCheck + ?Sized,
    {
        let violations =
            validate_entry(&entry, corpus, self.scope).map_err(ProcessError::Lookup)?;
        match ValidationErrors::from_violations(violations) {
            Some(errors) => Err(ProcessError::Rejected(errors)),
            None => Ok(entry),
        }
    }
}
