/*
 * scanner.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Single-pass tag scanner.
//!
//! Tags are recognised with these shapes (`ws` is optional ASCII whitespace,
//! `name` is one or more of `[A-Za-z0-9_./-]`):
//!
//! - `{{{ ws name ws }}}` raw interpolation
//! - `{{# ws name ws }}` section open
//! - `{{/name}}` section close
//! - `{{> ws name ws }}` partial
//! - `{{ ws name ws }}` escaped interpolation
//!
//! Anything else is text. When a `{{` does not begin a valid tag the scanner
//! moves on by a single byte, so `{{{x}}` still yields the escaped tag `{{x}}`
//! preceded by a literal `{`.

use memchr::memmem;

use crate::ast::{Token, TokenKind};

/// Whether `b` may appear in a tag name.
pub fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'/' | b'-')
}

/// Scan `source` into a flat token stream covering every byte.
pub fn scan(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let finder = memmem::Finder::new(b"{{");
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(offset) = finder.find(&bytes[pos..]) {
        let start = pos + offset;
        match match_tag(bytes, start) {
            Some((kind, end)) => {
                if text_start < start {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        span: text_start..start,
                    });
                }
                tokens.push(Token {
                    kind,
                    span: start..end,
                });
                pos = end;
                text_start = end;
            }
            None => pos = start + 1,
        }
    }

    if text_start < bytes.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            span: text_start..bytes.len(),
        });
    }

    tokens
}

/// Try to match a tag starting at `start`, which points at `{{`.
///
/// Returns the token kind and the end offset of the tag.
fn match_tag(bytes: &[u8], start: usize) -> Option<(TokenKind, usize)> {
    let mut cursor = Cursor {
        bytes,
        pos: start + 2,
    };

    match cursor.peek()? {
        b'{' => {
            cursor.pos += 1;
            let name = cursor.padded_name()?;
            cursor.expect(b"}}}")?;
            Some((TokenKind::Raw { name }, cursor.pos))
        }
        b'#' => {
            cursor.pos += 1;
            let name = cursor.padded_name()?;
            cursor.expect(b"}}")?;
            Some((TokenKind::SectionOpen { name }, cursor.pos))
        }
        b'/' => {
            cursor.pos += 1;
            let name = cursor.name()?;
            cursor.expect(b"}}")?;
            Some((TokenKind::SectionClose { name }, cursor.pos))
        }
        b'>' => {
            cursor.pos += 1;
            let name = cursor.padded_name()?;
            cursor.expect(b"}}")?;
            Some((TokenKind::Partial { name }, cursor.pos))
        }
        _ => {
            let name = cursor.padded_name()?;
            cursor.expect(b"}}")?;
            Some((TokenKind::Escaped { name }, cursor.pos))
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn name(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        // Name bytes are ASCII, so the slice is valid UTF-8.
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .map(str::to_string)
    }

    fn padded_name(&mut self) -> Option<String> {
        self.skip_whitespace();
        let name = self.name()?;
        self.skip_whitespace();
        Some(name)
    }

    fn expect(&mut self, literal: &[u8]) -> Option<()> {
        if self.bytes[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Some(())
        } else {
            None
        }
    }
}
