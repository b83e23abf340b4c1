//! Blog stream
//!
//! The stream lists posts newest first in pages of [`PAGE_SIZE`], each entry
//! carrying a short excerpt. When more posts remain, the view holds a
//! `placeholder` entry pointing at the next page so `stream.html` can load it.

use hearth_content::{Document, collapse_whitespace, truncate};
use hearth_template::{Template, Value, View};
use tracing::debug;

use crate::config::Mode;
use crate::dates::format_user_date;
use crate::error::Result;
use crate::site::Site;
use crate::source::BLOG_DIR;

pub const PAGE_SIZE: usize = 10;

/// Visible characters kept in a stream excerpt.
pub const EXCERPT_LENGTH: usize = 250;

pub const STREAM_TEMPLATE: &str = "stream.html";

/// Whether a post is listed. Development lists drafts too.
pub fn is_listed(doc: &Document, mode: Mode) -> bool {
    !mode.is_production() || doc.get("state") == Some("post")
}

/// `2024-01-05-hello.html` -> `2024-01-05-hello`
pub fn post_slug(file: &str) -> &str {
    file.strip_suffix(".html").unwrap_or(file)
}

/// View for the stream page starting at listed post `start`.
///
/// `files` are post file names in stream order. Unlisted posts are skipped
/// without counting towards `start`.
pub fn stream_view(site: &Site, files: &[String], start: usize) -> View {
    let mut entries = Vec::new();
    let mut index = 0;
    let mut remaining = files.iter();

    while index < start.saturating_add(PAGE_SIZE) {
        let Some(file) = remaining.next() else {
            break;
        };
        let Some(doc) = site.source().load_document(&format!("{BLOG_DIR}/{file}")) else {
            continue;
        };
        if !is_listed(&doc, site.mode()) {
            continue;
        }
        if index >= start {
            entries.push(stream_entry(file, doc));
        }
        index += 1;
    }

    let placeholder = if remaining.len() > 0 {
        vec![View::new().with("url", format!("/blog?id={index}"))]
    } else {
        Vec::new()
    };
    debug!(start, entries = entries.len(), next = ?placeholder.first().map(|_| index), "Built stream page");

    View::new()
        .with("entries", entries)
        .with("placeholder", placeholder)
}

fn stream_entry(file: &str, doc: Document) -> View {
    let content = collapse_whitespace(&doc.content);
    let excerpt = truncate(&content, EXCERPT_LENGTH);
    let more = excerpt != content;
    let date = doc.get("date").map(format_user_date);

    let mut view = doc.into_view();
    view.insert("url", format!("/blog/{}", post_slug(file)));
    if let Some(date) = date {
        view.insert("date", date);
    }
    view.insert("content", excerpt);
    view.insert("more", Value::Bool(more));
    view
}

/// Render the stream page starting at listed post `start` with `stream.html`.
pub fn render_stream(site: &Site, start: usize) -> Result<String> {
    let files = site.source().posts();
    let view = stream_view(site, &files, start);
    let template = Template::compile(&site.source().read_to_string(STREAM_TEMPLATE)?);
    Ok(template.render(&view, &site.source().resolver())?)
}
