//! Word corpus domain model.
//!
//! # Responsibility
//! - Define the canonical word entry shared by pipeline, storage and service.
//! - Keep derived fields (`characters`, `proper_noun`) in lockstep with `name`.
//!
//! # Invariants
//! - Every entry is identified by a stable `WordId`.
//! - Deletion is represented by a soft-delete marker, not hard delete.

pub mod word;
