/*
 * truncate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Length-bounded HTML truncation.
//!
//! [`truncate`] shortens an HTML fragment to a budget of visible characters.
//! Tags cost nothing, an entity reference costs one character, and text is
//! consumed a word at a time. Every opening tag whose closing tag appears
//! later in the input is tracked, and the closing tags that fall outside the
//! kept prefix are appended so the excerpt stays balanced.
//!
//! Some elements cannot be shortened meaningfully (code listings, tables,
//! media, sub-headings). Truncation stops right before the first of those.

use std::collections::BTreeMap;

use tracing::trace;

/// Marker appended when text was cut.
pub const ELLIPSIS: &str = "&hellip;";

/// A word that overruns the budget by at most this many characters is kept whole.
pub const CLIP_TOLERANCE: usize = 15;

/// Elements that end the excerpt instead of being partially included.
pub const NON_TRUNCATABLE: [&str; 8] = ["pre", "code", "img", "table", "style", "script", "h2", "h3"];

/// A closing tag scheduled at a position in the input.
#[derive(Debug)]
struct PendingClose {
    /// Normalised markup, e.g. `</p>`.
    markup: String,
    /// Length of the closing tag as written in the input.
    source_len: usize,
}

/// Truncate `html` to at most `budget` visible characters.
///
/// See the module documentation for the counting rules.
pub fn truncate(html: &str, budget: usize) -> String {
    let bytes = html.as_bytes();
    let mut pending: BTreeMap<usize, PendingClose> = BTreeMap::new();
    let mut ellipsis = false;
    let mut count = 0;
    let mut index = 0;

    while count < budget && index < html.len() {
        if let Some(close) = pending.remove(&index) {
            index += close.source_len;
            continue;
        }

        match bytes[index] {
            b'<' => match open_tag(&html[index..]) {
                Some((name, tag_len)) => {
                    if NON_TRUNCATABLE.contains(&name.as_str()) {
                        trace!(tag = %name, index, "Stopping before non-truncatable element");
                        break;
                    }
                    index += tag_len;
                    if let Some((offset, source_len)) = find_closing_tag(&html[index..], &name) {
                        pending.insert(
                            index + offset,
                            PendingClose {
                                markup: format!("</{}>", name),
                                source_len,
                            },
                        );
                    }
                }
                None => {
                    index += 1;
                    count += 1;
                }
            },
            b'&' => {
                index += 1;
                if let Some(len) = entity_len(&html[index..]) {
                    index += len;
                }
                count += 1;
            }
            _ => {
                if bytes[index] == b' ' {
                    index += 1;
                    count += 1;
                }
                let rest = &html[index..];
                let run_bytes = rest.find([' ', '<', '&']).unwrap_or(rest.len());
                let run_chars = rest[..run_bytes].chars().count();

                let (advance, consumed) = if count + run_chars > budget {
                    ellipsis = true;
                    if count + run_chars > budget + CLIP_TOLERANCE {
                        let keep = budget - count;
                        let keep_bytes = rest.char_indices().nth(keep).map_or(run_bytes, |(i, _)| i);
                        (keep_bytes, keep)
                    } else {
                        (run_bytes, run_chars)
                    }
                } else {
                    (run_bytes, run_chars)
                };
                index += advance;
                count += consumed;
            }
        }
    }

    // Running out of budget with visible text left over also counts as a cut
    if budget > 0 && count >= budget && has_visible_text(&html[index..]) {
        ellipsis = true;
    }

    let mut output = String::with_capacity(index + ELLIPSIS.len() + pending.len() * 8);
    output.push_str(&html[..index]);
    if ellipsis {
        output.push_str(ELLIPSIS);
    }
    for close in pending.values() {
        output.push_str(&close.markup);
    }
    output
}

/// Match an opening tag `<name ...>` at the start of `s`.
///
/// Returns the lowercased tag name and the length of the whole tag.
fn open_tag(s: &str) -> Option<(String, usize)> {
    let rest = s.strip_prefix('<')?;
    let name_len = rest
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(rest.len(), |(i, _)| i);
    if name_len == 0 {
        return None;
    }
    let end = rest[name_len..].find('>')?;
    Some((rest[..name_len].to_lowercase(), 1 + name_len + end + 1))
}

/// Find the `</name>` matching an element opened just before `s`.
///
/// Closing tags are matched case-insensitively and may have whitespace before
/// `>`. Nested elements of the same name are skipped together with their own
/// closing tags. Returns the offset of the closing tag and its length.
fn find_closing_tag(s: &str, name: &str) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    for (offset, _) in s.match_indices('<') {
        let tag = &s[offset..];
        if let Some(after) = tag.strip_prefix("</") {
            let Some(rest) = strip_prefix_ignore_case(after, name) else {
                continue;
            };
            let trimmed = rest.trim_start();
            if trimmed.starts_with('>') {
                depth -= 1;
                if depth == 0 {
                    let len = 2 + (after.len() - trimmed.len()) + 1;
                    return Some((offset, len));
                }
            }
        } else if let Some((open, tag_len)) = open_tag(tag) {
            if open == name && !tag[..tag_len].ends_with("/>") {
                depth += 1;
            }
        }
    }
    None
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, c) = chars.next()?;
        if !c.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let consumed = chars.next().map_or(text.len(), |(i, _)| i);
    Some(&text[consumed..])
}

/// Length of an entity body `#?[A-Za-z0-9]+;` at the start of `s`.
fn entity_len(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    let start = usize::from(b.first() == Some(&b'#'));
    let mut i = start;
    while b.get(i).is_some_and(u8::is_ascii_alphanumeric) {
        i += 1;
    }
    (i > start && b.get(i) == Some(&b';')).then_some(i + 1)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `s` holds anything besides whitespace and tags.
fn has_visible_text(s: &str) -> bool {
    let mut rest = s;
    loop {
        rest = rest.trim_start();
        let Some(after) = rest.strip_prefix('<') else {
            return !rest.is_empty();
        };
        let is_tag = after
            .strip_prefix('/')
            .unwrap_or(after)
            .starts_with(is_word_char);
        match after.find('>') {
            Some(end) if is_tag => rest = &after[end + 1..],
            _ => return true,
        }
    }
}

/// Collapse each pair of adjacent whitespace characters into one space.
///
/// Pairs do not overlap, so three spaces become two.
pub fn collapse_whitespace(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() && chars.peek().is_some_and(|n| n.is_whitespace()) {
            chars.next();
            output.push(' ');
        } else {
            output.push(c);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cut_at_word_boundary() {
        assert_eq!(
            truncate("<p>Hello world, this is a test</p>", 5),
            "<p>Hello&hellip;</p>"
        );
    }

    #[test]
    fn test_fits_entirely() {
        let html = "<p>Hello world</p>";
        assert_eq!(truncate(html, 100), html);
    }

    #[test]
    fn test_exact_fit_has_no_ellipsis() {
        assert_eq!(truncate("<p>Hello</p>", 5), "<p>Hello</p>");
        assert_eq!(truncate("Hello", 5), "Hello");
    }

    #[test]
    fn test_non_truncatable_at_start() {
        assert_eq!(truncate(r#"<img src="x.png">rest"#, 100), "");
        assert_eq!(truncate("<PRE>code</PRE>", 100), "");
    }

    #[test]
    fn test_stops_before_non_truncatable() {
        assert_eq!(
            truncate("<p>Intro</p><h2>Section</h2><p>More</p>", 100),
            "<p>Intro</p>"
        );
        assert_eq!(
            truncate("<div>Intro <code>x</code> tail</div>", 100),
            "<div>Intro </div>"
        );
    }

    #[test]
    fn test_short_overrun_keeps_whole_word() {
        // "Hi" + " " fills 3, "wonderful" overruns by 7 and is kept
        assert_eq!(truncate("Hi wonderful", 5), "Hi wonderful&hellip;");
    }

    #[test]
    fn test_long_overrun_is_clipped() {
        let word = "a".repeat(30);
        let html = format!("Hi {}", word);
        assert_eq!(truncate(&html, 5), "Hi aa&hellip;");
    }

    #[test]
    fn test_entity_counts_once() {
        assert_eq!(truncate("a&amp;b&#39;c d", 5), "a&amp;b&#39;c&hellip;");
        // A bare ampersand counts as a single character too
        assert_eq!(truncate("& x", 1), "&&hellip;");
    }

    #[test]
    fn test_nested_tags_closed_in_position_order() {
        assert_eq!(
            truncate("<div><p><em>one two three</em> four</p></div>", 3),
            "<div><p><em>one&hellip;</em></p></div>"
        );
    }

    #[test]
    fn test_nested_same_name_elements() {
        assert_eq!(
            truncate("<div><div>alpha beta gamma</div></div>", 5),
            "<div><div>alpha&hellip;</div></div>"
        );
        assert_eq!(
            truncate("<div><div>one</div> two three</div>", 7),
            "<div><div>one</div> two&hellip;</div>"
        );
        assert_eq!(
            truncate("<span>a <SPAN>b c d</span> e</Span>", 3),
            "<span>a <SPAN>b&hellip;</span></span>"
        );
    }

    #[test]
    fn test_closing_tag_reached_inline_is_not_repeated() {
        assert_eq!(
            truncate("<b>bold</b> plain text here", 10),
            "<b>bold</b> plain&hellip;"
        );
    }

    #[test]
    fn test_closing_tag_with_space_and_case() {
        assert_eq!(
            truncate("<B>bold</B > after words", 7),
            "<B>bold</B > after&hellip;"
        );
        assert_eq!(truncate("<p>abc def</P>", 3), "<p>abc&hellip;</p>");
    }

    #[test]
    fn test_unmatched_open_tag_left_open() {
        assert_eq!(truncate("<p>one two", 3), "<p>one&hellip;");
    }

    #[test]
    fn test_stray_angle_bracket_is_visible() {
        assert_eq!(truncate("a < b", 3), "a <&hellip;");
    }

    #[test]
    fn test_zero_budget() {
        assert_eq!(truncate("<p>text</p>", 0), "");
        assert_eq!(truncate("text", 0), "");
    }

    #[test]
    fn test_only_markup_left_is_not_a_cut() {
        assert_eq!(truncate("<p>abc</p>\n<p></p>", 3), "<p>abc</p>");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(truncate("héllo wörld", 5), "héllo&hellip;");
        let word = "é".repeat(30);
        assert_eq!(truncate(&word, 2), "éé&hellip;");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b"), "a b");
        assert_eq!(collapse_whitespace("a   b"), "a  b");
        assert_eq!(collapse_whitespace("a\n\nb"), "a b");
        assert_eq!(collapse_whitespace("a \tb c"), "a b c");
        assert_eq!(collapse_whitespace("plain"), "plain");
    }
}
