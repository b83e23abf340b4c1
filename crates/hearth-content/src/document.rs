/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Front matter documents.
//!
//! A document is plain text with an optional metadata block at the top:
//!
//! ```text
//! ---
//! title: "Hello"
//! date: 2024-01-05
//! ---
//! <p>Body</p>
//! ```
//!
//! Every line starting with `---` is a delimiter. Lines between the first and
//! second delimiter are `key: value` metadata; every other line is body.

use hearth_template::View;
use indexmap::IndexMap;

/// Name of the view field holding the document body.
pub const CONTENT_KEY: &str = "content";

/// A parsed document: metadata plus body content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Metadata fields in the order they appear.
    pub metadata: IndexMap<String, String>,

    /// Body lines joined with `\n`.
    pub content: String,
}

impl Document {
    /// Parse raw document text.
    ///
    /// Parsing never fails; text without a metadata block becomes body
    /// content in its entirety. Metadata lines without a `:` are ignored, and
    /// a later duplicate key overwrites an earlier one.
    pub fn parse(raw: &str) -> Self {
        let mut metadata = IndexMap::new();
        let mut body = Vec::new();
        let mut delimiters = 0usize;

        for line in split_lines(raw) {
            if line.starts_with("---") {
                delimiters += 1;
            } else if delimiters == 1 {
                if let Some((key, value)) = line.split_once(':') {
                    metadata.insert(key.trim().to_string(), unquote(value.trim()).to_string());
                }
            } else {
                body.push(line);
            }
        }

        Document {
            metadata,
            content: body.join("\n"),
        }
    }

    /// Look up a field. `content` always refers to the body.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == CONTENT_KEY {
            Some(&self.content)
        } else {
            self.metadata.get(key).map(String::as_str)
        }
    }

    /// Convert into a template view.
    ///
    /// Metadata is inserted first and `content` last, so a stray `content`
    /// metadata key cannot shadow the body.
    pub fn into_view(self) -> View {
        let mut view: View = self.metadata.into_iter().collect();
        view.insert(CONTENT_KEY, self.content);
        view
    }
}

/// Split on `\r\n`, `\r` or `\n`. A trailing newline yields a final empty line.
fn split_lines(raw: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(raw);
    std::iter::from_fn(move || {
        let text = rest?;
        match text.find(['\r', '\n']) {
            Some(i) => {
                let next = if text[i..].starts_with("\r\n") { i + 2 } else { i + 1 };
                rest = Some(&text[next..]);
                Some(&text[..i])
            }
            None => {
                rest = None;
                Some(text)
            }
        }
    })
}

/// Strip one pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') {
        value.get(1..value.len().saturating_sub(1)).unwrap_or("")
    } else {
        value
    }
}
