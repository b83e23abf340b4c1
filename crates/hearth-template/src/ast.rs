/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template tokens and syntax tree.
//!
//! The scanner produces a flat [`Token`] stream over the source; the parser
//! folds paired section tags into [`TemplateNode::Section`] nodes.

use std::ops::Range;

/// Kind of a scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text between tags.
    Text,

    /// `{{#name}}`
    SectionOpen { name: String },

    /// `{{/name}}`
    SectionClose { name: String },

    /// `{{>name}}`
    Partial { name: String },

    /// `{{{name}}}`
    Raw { name: String },

    /// `{{name}}`
    Escaped { name: String },
}

/// A token together with the byte range it covers in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// A node in the template syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// Literal text to be output as-is.
    Literal(String),

    /// Section block: `{{#name}}...{{/name}}`
    Section(Section),

    /// Partial inclusion: `{{>name}}`
    Partial(Partial),

    /// Field interpolation: `{{name}}` or `{{{name}}}`
    Interpolation(Interpolation),
}

/// Section block, rendered zero or more times depending on its field.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub body: Vec<TemplateNode>,
}

/// Partial inclusion.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    pub name: String,
    /// Original tag text, emitted when the partial cannot be resolved.
    pub tag: String,
}

/// Field interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    pub name: String,
    /// Whether the value is HTML-escaped (`{{name}}`) or inserted raw (`{{{name}}}`).
    pub escape: bool,
    /// Original tag text, emitted when the field is absent.
    pub tag: String,
}
