//! Posts and pages
//!
//! A post is a front matter document under `blog/` rendered with the site's
//! `post.html`. Any other `.html` file is itself a template, rendered against
//! the site configuration plus the lazily computed `feed` and `blog` fields.

use std::sync::Arc;

use hearth_template::{Template, Value};
use tracing::{debug, warn};

use crate::blog::render_stream;
use crate::dates::format_user_date;
use crate::error::Result;
use crate::site::Site;

pub const POST_TEMPLATE: &str = "post.html";

/// Render the post at `path` (e.g. `blog/2024-01-05-hello`, without `.html`).
///
/// Returns `None` when no such post exists.
pub fn render_post(site: &Site, path: &str) -> Result<Option<String>> {
    let Some(mut doc) = site.source().load_document(&format!("{path}.html")) else {
        debug!(path, "No post");
        return Ok(None);
    };

    let name = &site.config().name;
    doc.metadata
        .entry("author".to_string())
        .or_insert_with(|| name.clone());
    if let Some(date) = doc.metadata.get_mut("date") {
        *date = format_user_date(date);
    }

    let view = site.config().to_view().merge(&doc.into_view());
    let template = Template::compile(&site.source().read_to_string(POST_TEMPLATE)?);
    Ok(Some(template.render(&view, &site.source().resolver())?))
}

/// Render the page template at `file`.
///
/// `feed_url` is used for `feed` unless the configuration sets one.
pub fn render_page(site: &Arc<Site>, file: &str, feed_url: String) -> Result<String> {
    let template = Template::compile(&site.source().read_to_string(file)?);

    let mut view = site.config().to_view();
    let feed = site.config().feed_url().map_or(feed_url, str::to_string);
    view.insert("feed", Value::lazy(move || feed.clone()));

    let blog_site = Arc::clone(site);
    view.insert(
        "blog",
        Value::lazy(move || {
            render_stream(&blog_site, 0).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to render blog stream");
                String::new()
            })
        }),
    );

    Ok(template.render(&view, &site.source().resolver())?)
}
