//! hearth - a small blog and site server
//!
//! A site is a directory of HTML templates, static files and front matter
//! posts under `blog/`, configured by `app.json`. Pages are rendered with
//! [`hearth_template`]; post excerpts and feed content are produced with
//! [`hearth_content`].

pub mod blog;
pub mod cache;
pub mod config;
pub mod dates;
pub mod error;
pub mod feed;
pub mod pages;
pub mod router;
pub mod server;
pub mod site;
pub mod source;

pub use config::{Mode, SiteConfig};
pub use error::{Error, Result};
pub use site::{SharedSite, Site};
