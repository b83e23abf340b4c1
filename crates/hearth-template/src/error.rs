/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template rendering.

use thiserror::Error;

/// Errors that can occur during template operations.
///
/// Missing fields, unknown partials and malformed tags are not errors: they
/// degrade to empty output or verbatim tag text. The only hard failure is
/// runaway partial inclusion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Recursive partial inclusion detected.
    #[error("Recursive partial inclusion detected (depth > {max_depth}): {name}")]
    RecursivePartial { name: String, max_depth: usize },
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
