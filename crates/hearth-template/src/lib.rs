/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Logic-less template engine for hearth sites.
//!
//! The template language is a small Mustache dialect:
//!
//! - Escaped interpolation: `{{name}}`
//! - Raw interpolation: `{{{name}}}`
//! - Sections: `{{#name}}...{{/name}}`, repeated once per element of a list
//!   field, shown once for `true`, hidden otherwise
//! - Partials: `{{>name}}`, resolved through a [`PartialResolver`]
//!
//! Tag names use the characters `[A-Za-z0-9_./-]`. Interpolation of an
//! absent field leaves the tag in the output unchanged, while a section over
//! an absent field renders nothing.
//!
//! # Example
//!
//! ```
//! use hearth_template::{Template, View, NullResolver};
//!
//! let template = Template::compile("Hello, {{name}}!");
//! let view = View::new().with("name", "World");
//! let output = template.render(&view, &NullResolver).unwrap();
//! assert_eq!(output, "Hello, World!");
//! ```

pub mod ast;
pub mod context;
pub mod error;
pub mod escape;
pub mod evaluator;
pub mod parser;
pub mod resolver;
pub mod scanner;

// Re-export main types at crate root
pub use ast::{Interpolation, Partial, Section, TemplateNode, Token, TokenKind};
pub use context::{Producer, Value, View};
pub use error::{TemplateError, TemplateResult};
pub use escape::{Escaped, escape_html};
pub use evaluator::{DEFAULT_MAX_PARTIAL_DEPTH, Renderer, render};
pub use parser::Template;
pub use resolver::{FileSystemResolver, MemoryResolver, NullResolver, PartialResolver};
