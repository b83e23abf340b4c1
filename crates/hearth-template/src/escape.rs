/*
 * escape.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! HTML entity escaping for interpolated values.

use std::fmt;

/// Entity for a character that must not appear raw in HTML text or attributes.
fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        '/' => Some("&#x2F;"),
        '`' => Some("&#x60;"),
        '=' => Some("&#x3D;"),
        _ => None,
    }
}

/// Display adapter that writes its text with HTML entities escaped.
///
/// Output is produced in a single pass over the input, so an `&` that was
/// already part of an entity in the input is escaped once and entities that
/// this adapter emits are never revisited.
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for (index, c) in self.0.char_indices() {
            if let Some(replacement) = entity(c) {
                f.write_str(&self.0[last..index])?;
                f.write_str(replacement)?;
                last = index + c.len_utf8();
            }
        }
        f.write_str(&self.0[last..])
    }
}

/// Escape `& < > " ' / \` =` in `text`.
pub fn escape_html(text: &str) -> String {
    Escaped(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_each_character() {
        assert_eq!(escape_html("&"), "&amp;");
        assert_eq!(escape_html("<"), "&lt;");
        assert_eq!(escape_html(">"), "&gt;");
        assert_eq!(escape_html("\""), "&quot;");
        assert_eq!(escape_html("'"), "&#39;");
        assert_eq!(escape_html("/"), "&#x2F;");
        assert_eq!(escape_html("`"), "&#x60;");
        assert_eq!(escape_html("="), "&#x3D;");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_html("Hello, world"), "Hello, world");
        assert_eq!(escape_html(""), "");
        assert_eq!(escape_html("naïve café"), "naïve café");
    }

    #[test]
    fn test_no_double_escaping() {
        // The `&` of an existing entity is escaped exactly once
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn test_mixed_markup() {
        assert_eq!(
            escape_html(r#"<a href="/x">'hi'</a>"#),
            "&lt;a href&#x3D;&quot;&#x2F;x&quot;&gt;&#39;hi&#39;&lt;&#x2F;a&gt;"
        );
    }

    #[test]
    fn test_display_adapter() {
        assert_eq!(format!("[{}]", Escaped("1 < 2")), "[1 &lt; 2]");
    }
}
