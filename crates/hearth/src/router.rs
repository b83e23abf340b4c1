//! Request routing
//!
//! Routes are matched in registration order against the normalised request
//! path; the first match wins. Patterns are literal text where `*` matches
//! any run of characters and `?` makes the preceding character optional.
//! Matching ignores ASCII case.

use regex::Regex;

use crate::config::SiteConfig;
use crate::error::{Error, Result};

/// What a matched path is answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `301 Moved Permanently` to a configured target.
    Redirect(String),

    /// Redirect to `/`. Guards site sources that must not be served.
    Root,

    /// The Atom feed.
    Feed,

    /// A single blog post, `/blog/<name>`.
    Post,

    /// A page of the blog stream, `/blog?id=N`.
    Stream,

    /// A certificate challenge file under `/.well-known/acme-challenge/`.
    Certificate,

    /// A page or static file.
    Page,
}

/// Paths that hold templates, configuration or repository data.
const PROTECTED: [&str; 11] = [
    "/.git/?*",
    "/.vscode/?*",
    "/admin*",
    "/app.*",
    "/atom.xml",
    "/header.html",
    "/meta.html",
    "/package.json",
    "/post.html",
    "/post.css",
    "/site.css",
];

struct RouteEntry {
    pattern: String,
    regex: Regex,
    route: Route,
}

/// Ordered route table.
#[derive(Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// The route table of a site: configured redirects, protected sources,
    /// then the fixed blog and page routes.
    pub fn for_site(config: &SiteConfig) -> Result<Self> {
        let mut router = Router::new();
        for redirect in &config.redirects {
            router.add(&redirect.pattern, Route::Redirect(redirect.target.clone()))?;
        }
        for pattern in PROTECTED {
            router.add(pattern, Route::Root)?;
        }
        router.add("/blog/atom.xml", Route::Feed)?;
        router.add("/blog/*", Route::Post)?;
        router.add("/blog", Route::Stream)?;
        router.add("/.well-known/acme-challenge/*", Route::Certificate)?;
        router.add("/*", Route::Page)?;
        Ok(router)
    }

    /// Register `pattern`. Registering a pattern again replaces its route but
    /// keeps its original position.
    pub fn add(&mut self, pattern: &str, route: Route) -> Result<()> {
        if let Some(entry) = self.routes.iter_mut().find(|e| e.pattern == pattern) {
            entry.route = route;
            return Ok(());
        }
        self.routes.push(RouteEntry {
            pattern: pattern.to_string(),
            regex: pattern_regex(pattern)?,
            route,
        });
        Ok(())
    }

    /// The route of the first pattern matching `path`.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|e| e.regex.is_match(path))
            .map(|e| &e.route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Compile a route pattern into an anchored, case-insensitive regex.
pub fn pattern_regex(pattern: &str) -> Result<Regex> {
    let mut source = String::from("(?i)^");
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('?'),
            _ => source.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|e| Error::RoutePattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Resolve `.` and `..` segments and collapse repeated slashes.
///
/// The result always starts with `/` and never climbs above it. A trailing
/// slash is kept.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    let mut normalized = format!("/{}", segments.join("/"));
    if path.ends_with('/') && normalized.len() > 1 {
        normalized.push('/');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Redirect;
    use pretty_assertions::assert_eq;

    fn site_router() -> Router {
        let config = SiteConfig {
            name: "Site".to_string(),
            redirects: vec![
                Redirect {
                    pattern: "/old/*".to_string(),
                    target: "/new".to_string(),
                },
                Redirect {
                    pattern: "/blog/moved".to_string(),
                    target: "/blog/2024-01-05-moved".to_string(),
                },
            ],
            ..Default::default()
        };
        Router::for_site(&config).unwrap()
    }

    #[test]
    fn test_fixed_routes() {
        let router = site_router();
        assert_eq!(router.resolve("/blog/atom.xml"), Some(&Route::Feed));
        assert_eq!(router.resolve("/blog/2024-01-05-hello"), Some(&Route::Post));
        assert_eq!(router.resolve("/blog"), Some(&Route::Stream));
        assert_eq!(
            router.resolve("/.well-known/acme-challenge/abc"),
            Some(&Route::Certificate)
        );
        assert_eq!(router.resolve("/"), Some(&Route::Page));
        assert_eq!(router.resolve("/about/"), Some(&Route::Page));
    }

    #[test]
    fn test_protected_sources() {
        let router = site_router();
        for path in [
            "/.git",
            "/.git/",
            "/.git/config",
            "/.vscode/settings.json",
            "/admin",
            "/admin.cfg",
            "/app.json",
            "/app.py",
            "/atom.xml",
            "/post.html",
            "/POST.HTML",
            "/site.css",
        ] {
            assert_eq!(router.resolve(path), Some(&Route::Root), "{path}");
        }
        // Literal dots do not match arbitrary characters
        assert_eq!(router.resolve("/appxjson"), Some(&Route::Page));
    }

    #[test]
    fn test_redirects_take_precedence() {
        let router = site_router();
        assert_eq!(
            router.resolve("/old/page.html"),
            Some(&Route::Redirect("/new".to_string()))
        );
        assert_eq!(
            router.resolve("/blog/moved"),
            Some(&Route::Redirect("/blog/2024-01-05-moved".to_string()))
        );
    }

    #[test]
    fn test_readding_pattern_keeps_position() {
        let mut router = Router::new();
        router.add("/a*", Route::Root).unwrap();
        router.add("/*", Route::Page).unwrap();
        router.add("/a*", Route::Feed).unwrap();

        assert_eq!(router.len(), 2);
        assert_eq!(router.resolve("/abc"), Some(&Route::Feed));
        assert_eq!(router.resolve("/xyz"), Some(&Route::Page));
    }

    #[test]
    fn test_no_match() {
        let mut router = Router::new();
        router.add("/only", Route::Page).unwrap();
        assert_eq!(router.resolve("/other"), None);
        assert_eq!(router.resolve("/only/more"), None);
    }

    #[test]
    fn test_pattern_regex_escapes_metacharacters() {
        let regex = pattern_regex("/a+b(c)").unwrap();
        assert!(regex.is_match("/a+b(c)"));
        assert!(!regex.is_match("/aab(c)"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/blog/"), "/blog/");
        assert_eq!(normalize_path("//a///b"), "/a/b");
        assert_eq!(normalize_path("/a/./b/../c"), "/a/c");
        assert_eq!(normalize_path("/../../etc/passwd"), "/etc/passwd");
        assert_eq!(normalize_path("/a/.."), "/");
    }
}
