//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate pipeline and repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod word_service;
