/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Partial template resolution.
//!
//! This module provides the [`PartialResolver`] trait and implementations for
//! loading partial templates from the filesystem, from memory, or not at all.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Trait for loading partial templates.
pub trait PartialResolver {
    /// Load a partial template by name.
    ///
    /// Returns the partial's source text, or `None` if it does not exist, in
    /// which case the `{{>name}}` tag is left in the output verbatim.
    fn get_partial(&self, name: &str) -> Option<String>;
}

impl<F> PartialResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get_partial(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Resolver that loads partials from files below a root directory.
///
/// A partial name is used as a path relative to the root (`{{>head.html}}`
/// reads `<root>/head.html`). Names that would climb out of the root are
/// refused.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PartialResolver for FileSystemResolver {
    fn get_partial(&self, name: &str) -> Option<String> {
        let path = resolve_partial_path(name, &self.root)?;
        std::fs::read_to_string(path).ok()
    }
}

/// Resolver that returns nothing.
///
/// Use this resolver when partial tags should pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct NullResolver;

impl PartialResolver for NullResolver {
    fn get_partial(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Resolver that loads partials from an in-memory map.
///
/// Useful for testing and for templates bundled into the application.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    partials: HashMap<String, String>,
}

impl MemoryResolver {
    /// Create a new empty memory resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a partial to the resolver.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.partials.insert(name.into(), content.into());
        self
    }

    /// Create a resolver with the given partials.
    pub fn with_partials(
        partials: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut resolver = Self::new();
        for (name, content) in partials {
            resolver.add(name, content);
        }
        resolver
    }
}

impl PartialResolver for MemoryResolver {
    fn get_partial(&self, name: &str) -> Option<String> {
        self.partials.get(name).cloned()
    }
}

/// Resolve the path of a partial below `root`.
///
/// Returns `None` for absolute names and names containing `..`.
pub fn resolve_partial_path(partial_name: &str, root: &Path) -> Option<PathBuf> {
    let partial_path = Path::new(partial_name);
    let contained = partial_path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    contained.then(|| root.join(partial_path))
}
