/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Content handling for hearth sites.
//!
//! - [`Document`]: front matter metadata plus body, parsed from raw text
//! - [`truncate`]: shorten an HTML fragment to a visible-character budget
//!   while keeping its tags balanced

pub mod document;
pub mod truncate;

pub use document::{CONTENT_KEY, Document};
pub use truncate::{CLIP_TOLERANCE, ELLIPSIS, NON_TRUNCATABLE, collapse_whitespace, truncate};
