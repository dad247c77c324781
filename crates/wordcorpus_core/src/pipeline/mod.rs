//! Admission pipeline for word entries.
//!
//! # Responsibility
//! - Derive the anagram signature and proper-noun flag from a raw name.
//! - Validate assembled entries and aggregate every violation.
//!
//! # Invariants
//! - Derivation always runs before validation.
//! - Stages are pure; only the uniqueness lookup reads corpus state.

pub mod processor;
pub mod proper_noun;
pub mod signature;
pub mod validation;
