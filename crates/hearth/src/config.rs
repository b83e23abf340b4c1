//! Site configuration
//!
//! A site is configured by `app.json` at its root. Besides the keys hearth
//! understands itself, every string or boolean entry is handed to page
//! templates as a view field.

use std::path::Path;

use hearth_template::{Value, View};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the site configuration, relative to the site root.
pub const CONFIG_FILE: &str = "app.json";

/// Environment variable selecting the run mode.
pub const ENV_VAR: &str = "HEARTH_ENV";

/// Whether rendered output may be cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Every request reads the site from disk. Drafts are visible.
    #[default]
    Development,

    /// Pages, files and the path index are computed once and kept.
    /// Only posts with `state: post` are listed.
    Production,
}

impl Mode {
    /// Production when `production` is set or `HEARTH_ENV=production`.
    pub fn resolve(production: bool) -> Self {
        let from_env = std::env::var(ENV_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("production"));
        if production || from_env {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Mode::Production
    }
}

/// A redirect declared in the site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Route pattern, `*` matching any run of characters.
    pub pattern: String,

    /// Location answered with `301 Moved Permanently`.
    pub target: String,
}

/// Contents of `app.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name, used as the feed title and default post author.
    pub name: String,

    /// Explicit feed URL. When empty the feed link points at `/blog/atom.xml`
    /// on the requesting host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirects: Vec<Redirect>,

    /// Remaining keys, passed to templates.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SiteConfig {
    /// Load `app.json` from the site root.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content)?;
        debug!(name = %config.name, redirects = config.redirects.len(), "Loaded site config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// The configured feed URL, if one is set and non-empty.
    pub fn feed_url(&self) -> Option<&str> {
        self.feed.as_deref().filter(|f| !f.is_empty())
    }

    /// Template view of the configuration.
    ///
    /// Holds `name`, `feed` when set, and every extra string or boolean entry.
    /// Other JSON values have no template representation and are skipped.
    pub fn to_view(&self) -> View {
        let mut view = View::new().with("name", self.name.as_str());
        if let Some(feed) = &self.feed {
            view.insert("feed", feed.as_str());
        }
        for (key, value) in &self.extra {
            let value = match value {
                serde_json::Value::String(s) => Value::from(s.as_str()),
                serde_json::Value::Bool(b) => Value::from(*b),
                _ => continue,
            };
            view.insert(key.as_str(), value);
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_config() {
        let config = SiteConfig::parse(
            r#"{
                "name": "My Site",
                "feed": "https://feeds.example.com/site",
                "redirects": [{ "pattern": "/old/*", "target": "/new" }],
                "description": "Notes",
                "analytics": false,
                "pages": [{ "name": "About", "url": "/about" }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "My Site");
        assert_eq!(config.feed_url(), Some("https://feeds.example.com/site"));
        assert_eq!(
            config.redirects,
            vec![Redirect {
                pattern: "/old/*".to_string(),
                target: "/new".to_string(),
            }]
        );
        assert_eq!(config.extra.len(), 3);
    }

    #[test]
    fn test_minimal_config() {
        let config = SiteConfig::parse(r#"{ "name": "Site" }"#).unwrap();
        assert_eq!(config.feed, None);
        assert!(config.redirects.is_empty());
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_empty_feed_is_unset() {
        let config = SiteConfig::parse(r#"{ "name": "Site", "feed": "" }"#).unwrap();
        assert_eq!(config.feed_url(), None);
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let err = SiteConfig::parse(r#"{ "feed": "x" }"#).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_view_keeps_strings_and_bools() {
        let config = SiteConfig::parse(
            r#"{ "name": "Site", "description": "Notes", "comments": true, "count": 3, "pages": [] }"#,
        )
        .unwrap();
        let view = config.to_view();

        assert_eq!(view.get_str("name"), Some("Site"));
        assert_eq!(view.get_str("description"), Some("Notes"));
        assert_eq!(view.get("comments"), Some(&Value::Bool(true)));
        assert!(!view.contains_key("count"));
        assert!(!view.contains_key("pages"));
        assert!(!view.contains_key("feed"));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = SiteConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
