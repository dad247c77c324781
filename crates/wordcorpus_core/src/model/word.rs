//! Word entry domain model.
//!
//! # Responsibility
//! - Define the single persisted entity of the corpus.
//! - Run the derivation stages whenever `name` is set.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another entry.
//! - `characters == derive_signature(name)` and
//!   `proper_noun == classify_proper_noun(name)` at all times.
//! - `deleted_at` is the source of truth for tombstone state.

use crate::pipeline::proper_noun::classify_proper_noun;
use crate::pipeline::signature::derive_signature;
use crate::pipeline::validation::{field_violations, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every word entry.
pub type WordId = Uuid;

/// Validated fields of a word entry, used to label violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordField {
    Name,
    Characters,
}

impl WordField {
    /// Persisted column/field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Characters => "characters",
        }
    }
}

impl Display for WordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state derived from the soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Active,
    /// Tombstoned at the given Unix epoch milliseconds.
    Deleted { at: i64 },
}

/// Canonical corpus record.
///
/// Derived fields are private so they can only change through [`WordEntry::set_name`].
/// Timestamps are Unix epoch milliseconds and are stamped by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WordRecord")]
pub struct WordEntry {
    uuid: WordId,
    name: String,
    characters: String,
    proper_noun: bool,
    created_at: Option<i64>,
    updated_at: Option<i64>,
    deleted_at: Option<i64>,
}

impl WordEntry {
    /// Creates an unsaved entry with a generated ID and derived fields.
    ///
    /// This does not validate; see `WordEntryProcessor` for admission.
    pub fn new(name: impl Into<String>) -> Self {
        Self::derived(Uuid::new_v4(), name.into())
    }

    /// Creates an unsaved entry with a caller-provided stable ID.
    ///
    /// # Errors
    /// - `WordRecordError::NilId` when `uuid` is nil.
    pub fn with_id(uuid: WordId, name: impl Into<String>) -> Result<Self, WordRecordError> {
        if uuid.is_nil() {
            return Err(WordRecordError::NilId);
        }
        Ok(Self::derived(uuid, name.into()))
    }

    fn derived(uuid: WordId, name: String) -> Self {
        let characters = derive_signature(&name);
        let proper_noun = classify_proper_noun(&name);
        Self {
            uuid,
            name,
            characters,
            proper_noun,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn id(&self) -> WordId {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical anagram signature of `name`.
    pub fn characters(&self) -> &str {
        &self.characters
    }

    pub fn proper_noun(&self) -> bool {
        self.proper_noun
    }

    pub fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<i64> {
        self.deleted_at
    }

    /// Replaces `name` and recomputes both derived fields.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.characters = derive_signature(&self.name);
        self.proper_noun = classify_proper_noun(&self.name);
    }

    /// Marks this entry as softly deleted at `at_epoch_ms`.
    ///
    /// A second call keeps the first marker.
    pub fn soft_delete(&mut self, at_epoch_ms: i64) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(at_epoch_ms);
        }
    }

    /// Clears the soft-delete marker.
    pub fn restore(&mut self) {
        self.deleted_at = None;
    }

    pub fn status(&self) -> EntryStatus {
        match self.deleted_at {
            Some(at) => EntryStatus::Deleted { at },
            None => EntryStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Checks every field rule that does not need corpus state.
    ///
    /// Storage write paths call this before SQL mutations; uniqueness is left
    /// to the pipeline lookup and the storage unique index.
    pub fn check_invariants(&self) -> Result<(), ValidationErrors> {
        match ValidationErrors::from_violations(field_violations(self)) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}

/// Persisted/wire layout of a word entry.
///
/// `characters` and `proper_noun` are optional so records written before
/// derivation can still be read; when present they must agree with `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub uuid: WordId,
    pub name: String,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub proper_noun: Option<bool>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub deleted_at: Option<i64>,
}

impl TryFrom<WordRecord> for WordEntry {
    type Error = WordRecordError;

    fn try_from(record: WordRecord) -> Result<Self, Self::Error> {
        let mut entry = WordEntry::with_id(record.uuid, record.name)?;

        if let Some(found) = record.characters {
            if found != entry.characters {
                return Err(WordRecordError::CharactersMismatch {
                    expected: entry.characters,
                    found,
                });
            }
        }
        if let Some(found) = record.proper_noun {
            if found != entry.proper_noun {
                return Err(WordRecordError::ProperNounMismatch {
                    expected: entry.proper_noun,
                    found,
                });
            }
        }

        entry.created_at = record.created_at;
        entry.updated_at = record.updated_at;
        entry.deleted_at = record.deleted_at;
        Ok(entry)
    }
}

/// Rejection reasons when rebuilding an entry from external data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordRecordError {
    NilId,
    CharactersMismatch { expected: String, found: String },
    ProperNounMismatch { expected: bool, found: bool },
}

impl Display for WordRecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "word id must not be nil"),
            Self::CharactersMismatch { expected, found } => write!(
                f,
                "characters `{found}` does not match derived signature `{expected}`"
            ),
            Self::ProperNounMismatch { expected, found } => write!(
                f,
                "proper_noun ({found}) does not match derived classification ({expected})"
            ),
        }
    }
}

impl Error for WordRecordError {}
