//! Site context - shared state for request handlers
//!
//! Holds the configuration, the source tree, the route table and the output
//! caches. Wrapped in `Arc` and shared across all requests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use tracing::info;

use crate::cache::ContentCache;
use crate::config::{Mode, SiteConfig};
use crate::error::{Error, Result};
use crate::router::Router;
use crate::source::SiteSource;

pub type SharedSite = Arc<Site>;

pub struct Site {
    config: SiteConfig,
    mode: Mode,
    source: SiteSource,
    router: Router,

    /// Rendered pages, posts, stream pages and feeds.
    pages: ContentCache<String>,

    /// Static file contents.
    files: ContentCache<Bytes>,
}

impl Site {
    /// Open the site rooted at `root`, reading its `app.json`.
    pub fn open(root: impl Into<PathBuf>, mode: Mode) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::SiteNotFound(root));
        }
        let config = SiteConfig::load(&root)?;
        Self::with_config(root, config, mode)
    }

    /// Open a site with an already loaded configuration.
    pub fn with_config(root: impl Into<PathBuf>, config: SiteConfig, mode: Mode) -> Result<Self> {
        let root = root.into();
        let router = Router::for_site(&config)?;
        let source = SiteSource::new(&root, mode);
        info!(
            root = %root.display(),
            name = %config.name,
            ?mode,
            routes = router.len(),
            "Opened site"
        );
        Ok(Self {
            config,
            mode,
            source,
            router,
            pages: ContentCache::new(mode),
            files: ContentCache::new(mode),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn source(&self) -> &SiteSource {
        &self.source
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn pages(&self) -> &ContentCache<String> {
        &self.pages
    }

    pub fn files(&self) -> &ContentCache<Bytes> {
        &self.files
    }
}
