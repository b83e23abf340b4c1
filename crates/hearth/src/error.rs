//! Error types for hearth

use std::path::PathBuf;

use hearth_template::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Site directory not found: {0}")]
    SiteNotFound(PathBuf),

    #[error("Failed to read site config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse site config: {0}")]
    ConfigParse(String),

    #[error("Invalid route pattern {pattern:?}: {message}")]
    RoutePattern { pattern: String, message: String },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
