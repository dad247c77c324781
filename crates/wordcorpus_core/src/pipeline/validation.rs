//! Validation rules for assembled word entries.
//!
//! # Responsibility
//! - Check presence, length and uniqueness of `name`, and presence of
//!   `characters`.
//! - Aggregate every failing rule instead of stopping at the first one.
//!
//! # Invariants
//! - Violations are reported in rule declaration order:
//!   name presence, name length, name uniqueness, characters presence.
//! - `ValidationErrors` is never empty.

use crate::model::word::{WordEntry, WordField, WordId};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inclusive lower bound for `name` length, in characters.
pub const NAME_MIN_CHARS: usize = 1;
/// Inclusive upper bound for `name` length, in characters.
pub const NAME_MAX_CHARS: usize = 255;

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Field is empty or blank.
    RequiredField { field: WordField },
    /// Field length is outside `min..=max`.
    Length {
        field: WordField,
        min: usize,
        max: usize,
        actual: usize,
    },
    /// Another entry in scope already uses the same value.
    Uniqueness { field: WordField },
}

impl Violation {
    pub fn field(&self) -> WordField {
        match self {
            Self::RequiredField { field }
            | Self::Length { field, .. }
            | Self::Uniqueness { field } => *field,
        }
    }

    /// Stable machine-readable code, safe to log.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequiredField { .. } => "required",
            Self::Length { .. } => "length",
            Self::Uniqueness { .. } => "uniqueness",
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequiredField { field } => write!(f, "{field} is required"),
            Self::Length {
                field, min, max, ..
            } => write!(
                f,
                "{field} must have more than {min} and less than {max} characters"
            ),
            Self::Uniqueness { field } => write!(f, "{field} already exists in corpus"),
        }
    }
}

/// Non-empty, ordered set of violations from one validation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    /// Wraps `violations`, returning `None` when there is nothing to report.
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    pub fn single(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }

    /// Comma-separated `field:code` summary without user data.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|violation| format!("{}:{}", violation.field(), violation.code()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Which existing entries block reuse of a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessScope {
    /// Only active entries count; soft-deleted names may be reused.
    #[default]
    ActiveOnly,
    /// Soft-deleted entries also count.
    Global,
}

impl UniquenessScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActiveOnly => "active_only",
            Self::Global => "global",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active_only" | "active" => Some(Self::ActiveOnly),
            "global" => Some(Self::Global),
            _ => None,
        }
    }

    pub fn includes(self, entry: &WordEntry) -> bool {
        match self {
            Self::ActiveOnly => entry.is_active(),
            Self::Global => true,
        }
    }
}

/// Corpus lookup used by the uniqueness rule.
///
/// Matching is exact and case-sensitive. This is an early-rejection read;
/// storage enforces the authoritative unique constraint.
pub trait UniquenessCheck {
    type Error;

    /// Returns whether an entry other than `exclude` already uses `name`.
    fn name_exists(
        &self,
        name: &str,
        scope: UniquenessScope,
        exclude: Option<WordId>,
    ) -> Result<bool, Self::Error>;
}

impl UniquenessCheck for [WordEntry] {
    type Error = Infallible;

    fn name_exists(
        &self,
        name: &str,
        scope: UniquenessScope,
        exclude: Option<WordId>,
    ) -> Result<bool, Self::Error> {
        Ok(self.iter().any(|entry| {
            entry.name() == name && scope.includes(entry) && Some(entry.id()) != exclude
        }))
    }
}

/// Checks every rule that needs no corpus state, in declaration order.
pub fn field_violations(entry: &WordEntry) -> Vec<Violation> {
    let mut violations = name_violations(entry.name());
    violations.extend(characters_violations(entry.characters()));
    violations
}

/// Runs all rules against `entry`, consulting `corpus` for uniqueness.
///
/// `entry` itself is excluded from the lookup so updates do not collide
/// with their own stored row. An empty result means the entry is accepted.
///
/// # Errors
/// - Propagates lookup failures from `corpus` unchanged.
pub fn validate_entry<C>(
    entry: &WordEntry,
    corpus: &C,
    scope: UniquenessScope,
) -> Result<Vec<Violation>, C::Error>
where
    C: UniquenessCheck + ?Sized,
{
    let mut violations = name_violations(entry.name());
    if corpus.name_exists(entry.name(), scope, Some(entry.id()))? {
        violations.push(Violation::Uniqueness {
            field: WordField::Name,
        });
    }
    violations.extend(characters_violations(entry.characters()));
    Ok(violations)
}

fn name_violations(name: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    if name.trim().is_empty() {
        violations.push(Violation::RequiredField {
            field: WordField::Name,
        });
    }

    let length = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) {
        violations.push(Violation::Length {
            field: WordField::Name,
            min: NAME_MIN_CHARS,
            max: NAME_MAX_CHARS,
            actual: length,
        });
    }

    violations
}

fn characters_violations(characters: &str) -> Vec<Violation> {
    if characters.is_empty() {
        vec![Violation::RequiredField {
            field: WordField::Characters,
        }]
    } else {
        Vec::new()
    }
}
