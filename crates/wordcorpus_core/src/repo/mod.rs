//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the word corpus.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `WordEntry::check_invariants()` before
//!   persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateName`) in
//!   addition to DB transport errors.

pub mod word_repo;
