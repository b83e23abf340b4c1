//! Atom feed
//!
//! The feed view is rendered with `atom.xml` from the site root. Entry content
//! is truncated and HTML-escaped so the template can embed it directly.

use chrono::{DateTime, Utc};
use hearth_content::truncate;
use hearth_template::{Template, Value, View, escape_html};
use tracing::warn;

use crate::blog::{is_listed, post_slug};
use crate::dates::{format_feed_date, parse_date};
use crate::error::Result;
use crate::site::Site;
use crate::source::BLOG_DIR;

/// Maximum number of entries in the feed.
pub const FEED_LENGTH: usize = 10;

/// Visible characters of post content kept per entry.
pub const FEED_CONTENT_LENGTH: usize = 10_000;

pub const FEED_TEMPLATE: &str = "atom.xml";

/// Build the feed view for a site served at `host` (e.g. `https://example.com`).
pub fn feed_view(site: &Site, host: &str) -> View {
    let name = site.config().name.as_str();
    let mut latest: Option<DateTime<Utc>> = None;
    let mut entries = Vec::new();

    for file in site.source().posts() {
        if entries.len() >= FEED_LENGTH {
            break;
        }
        let Some(doc) = site.source().load_document(&format!("{BLOG_DIR}/{file}")) else {
            continue;
        };
        if !is_listed(&doc, site.mode()) {
            continue;
        }

        let published = doc.get("date").and_then(parse_date);
        let updated = doc.get("updated").and_then(parse_date).or(published);
        if published.is_none() {
            warn!(file = %file, date = ?doc.get("date"), "Post has no parseable date");
        }
        if let Some(updated) = updated {
            let updated = updated.with_timezone(&Utc);
            latest = latest.max(Some(updated));
        }

        let author = match doc.get("author") {
            Some(author) if author != name => Value::from(author),
            _ => Value::Bool(false),
        };
        let content = escape_html(&truncate(&doc.content, FEED_CONTENT_LENGTH));

        let mut entry = doc.into_view();
        entry.insert("url", format!("{host}/blog/{}", post_slug(&file)));
        entry.insert("author", author);
        if let Some(published) = published {
            entry.insert("date", format_feed_date(&published));
        }
        if let Some(updated) = updated {
            entry.insert("updated", format_feed_date(&updated));
        }
        entry.insert("content", content);
        entries.push(entry);
    }

    let updated = latest.unwrap_or_else(Utc::now);
    View::new()
        .with("name", name)
        .with("author", name)
        .with("host", host)
        .with("url", format!("{host}/blog/atom.xml"))
        .with("updated", format_feed_date(&updated))
        .with("entries", entries)
}

/// Render the feed with `atom.xml`.
pub fn render_feed(site: &Site, host: &str) -> Result<String> {
    let view = feed_view(site, host);
    let template = Template::compile(&site.source().read_to_string(FEED_TEMPLATE)?);
    Ok(template.render(&view, &site.source().resolver())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, SiteConfig};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn site(mode: Mode, posts: &[(&str, &str)]) -> (TempDir, Site) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("blog")).unwrap();
        for (name, raw) in posts {
            fs::write(temp.path().join("blog").join(name), raw).unwrap();
        }
        let config = SiteConfig {
            name: "Site".to_string(),
            ..Default::default()
        };
        let site = Site::with_config(temp.path(), config, mode).unwrap();
        (temp, site)
    }

    fn entries(view: &View) -> &[View] {
        match view.get("entries") {
            Some(Value::List(items)) => items,
            other => panic!("entries is not a list: {other:?}"),
        }
    }

    #[test]
    fn test_entry_fields() {
        let (_temp, site) = site(
            Mode::Development,
            &[
                (
                    "2024-01-05-a.html",
                    "---\ntitle: A\ndate: 2024-01-05 10:00:00\nauthor: Guest\nstate: post\n---\n<p>x < y</p>",
                ),
                (
                    "2024-01-01-b.html",
                    "---\ntitle: B\ndate: 2024-01-01\nupdated: 2024-02-01T12:00:00+01:00\nauthor: Site\n---\nbody",
                ),
            ],
        );
        let view = feed_view(&site, "https://example.com");
        let entries = entries(&view);

        assert_eq!(entries.len(), 2);
        let a = &entries[0];
        assert_eq!(a.get_str("url"), Some("https://example.com/blog/2024-01-05-a"));
        assert_eq!(a.get_str("author"), Some("Guest"));
        assert_eq!(a.get_str("date"), Some("2024-01-05T10:00:00Z"));
        assert_eq!(a.get_str("updated"), Some("2024-01-05T10:00:00Z"));
        assert_eq!(a.get_str("content"), Some("&lt;p&gt;x &lt; y&lt;&#x2F;p&gt;"));

        let b = &entries[1];
        assert_eq!(b.get("author"), Some(&Value::Bool(false)));
        assert_eq!(b.get_str("date"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(b.get_str("updated"), Some("2024-02-01T11:00:00Z"));

        assert_eq!(view.get_str("updated"), Some("2024-02-01T11:00:00Z"));
        assert_eq!(view.get_str("url"), Some("https://example.com/blog/atom.xml"));
        assert_eq!(view.get_str("author"), Some("Site"));
    }

    #[test]
    fn test_missing_author_is_false() {
        let (_temp, site) = site(Mode::Development, &[("p.html", "---\ntitle: P\n---\nbody")]);
        let view = feed_view(&site, "http://localhost:8080");
        assert_eq!(entries(&view)[0].get("author"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_production_skips_drafts_and_caps_length() {
        let mut posts: Vec<(String, String)> = (1..=12)
            .map(|i| {
                (
                    format!("2024-01-{i:02}.html"),
                    format!("---\ntitle: {i}\ndate: 2024-01-{i:02}\nstate: post\n---\nbody"),
                )
            })
            .collect();
        posts.push((
            "2024-02-01.html".to_string(),
            "---\ntitle: draft\ndate: 2024-02-01\nstate: draft\n---\nbody".to_string(),
        ));
        let borrowed: Vec<(&str, &str)> = posts.iter().map(|(n, r)| (n.as_str(), r.as_str())).collect();
        let (_temp, site) = site(Mode::Production, &borrowed);

        let view = feed_view(&site, "https://example.com");
        let entries = entries(&view);
        assert_eq!(entries.len(), FEED_LENGTH);
        assert_eq!(entries[0].get_str("title"), Some("12"));
        assert_eq!(view.get_str("updated"), Some("2024-01-12T00:00:00Z"));
    }

    #[test]
    fn test_render_feed_template() {
        let (temp, site) = site(
            Mode::Development,
            &[("2024-01-05-a.html", "---\ntitle: A\ndate: 2024-01-05\n---\n<b>hi</b>")],
        );
        fs::write(
            temp.path().join("atom.xml"),
            "<feed><title>{{name}}</title><updated>{{updated}}</updated>\n{{#entries}}<entry><id>{{{url}}}</id>{{#author}}<author>{{author}}</author>{{/author}}<content type='html'>{{{content}}}</content></entry>\n{{/entries}}</feed>",
        )
        .unwrap();

        let xml = render_feed(&site, "https://example.com").unwrap();
        assert_eq!(
            xml,
            "<feed><title>Site</title><updated>2024-01-05T00:00:00Z</updated>\n\
             <entry><id>https://example.com/blog/2024-01-05-a</id><content type='html'>&lt;b&gt;hi&lt;&#x2F;b&gt;</content></entry>\n\
             </feed>"
        );
    }
}
