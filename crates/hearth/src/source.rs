//! Site source files
//!
//! All paths are relative to the site root and use `/` separators. A
//! trailing `/` names a directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use hearth_content::Document;
use hearth_template::FileSystemResolver;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::cache::ContentCache;
use crate::config::Mode;
use crate::error::Result;

/// Directory holding blog posts.
pub const BLOG_DIR: &str = "blog";

/// The files of a site.
pub struct SiteSource {
    root: PathBuf,

    /// Known files and directories, present in production only.
    index: Option<PathIndex>,

    posts: ContentCache<Vec<String>>,
}

impl SiteSource {
    pub fn new(root: impl Into<PathBuf>, mode: Mode) -> Self {
        let root = root.into();
        let index = mode.is_production().then(|| PathIndex::build(&root));
        Self {
            root,
            index,
            posts: ContentCache::new(mode),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolver reading partials from the site root.
    pub fn resolver(&self) -> FileSystemResolver {
        FileSystemResolver::new(&self.root)
    }

    /// Whether `path` names an existing file or directory.
    pub fn exists(&self, path: &str) -> bool {
        match &self.index {
            Some(index) => index.exists(path),
            None => self.full_path(path).exists(),
        }
    }

    pub fn is_dir(&self, path: &str) -> bool {
        match &self.index {
            Some(index) => index.is_dir(path),
            None => self.full_path(path).is_dir(),
        }
    }

    pub fn read_to_string(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.full_path(path))?)
    }

    pub fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.full_path(path))?)
    }

    /// File names of the `.html` files in `blog/`, newest name first.
    ///
    /// Posts are named so that reverse lexical order is reverse chronological
    /// order, e.g. `2024-01-05-hello.html`.
    pub fn posts(&self) -> Vec<String> {
        let listed = self.posts.get_or_insert_with("blog:files", || {
            let dir = self.root.join(BLOG_DIR);
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "No blog directory");
                    return Ok::<_, std::io::Error>(Vec::new());
                }
            };
            let mut files: Vec<String> = entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| Path::new(name).extension().is_some_and(|ext| ext == "html"))
                .collect();
            files.sort_unstable_by(|a, b| b.cmp(a));
            Ok(files)
        });
        listed.unwrap_or_default()
    }

    /// Load a front matter document.
    ///
    /// Returns `None` when `path` is missing, is a directory or cannot be read.
    pub fn load_document(&self, path: &str) -> Option<Document> {
        if !self.exists(path) || self.is_dir(path) {
            return None;
        }
        match self.read_to_string(path) {
            Ok(raw) => Some(Document::parse(&raw)),
            Err(e) => {
                warn!(path, error = %e, "Failed to read document");
                None
            }
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

/// Snapshot of the site tree taken at startup.
///
/// Directories are stored with a trailing `/`. Dot entries are skipped, except
/// `.well-known` which carries certificate challenges.
#[derive(Debug, Default)]
struct PathIndex {
    paths: HashSet<String>,
}

impl PathIndex {
    fn build(root: &Path) -> Self {
        let mut paths = HashSet::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_ignored(e));

        for entry in walker.filter_map(|e| e.ok()) {
            if entry.depth() == 0 {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let mut key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if entry.file_type().is_dir() {
                key.push('/');
            }
            paths.insert(key);
        }

        debug!(root = %root.display(), entries = paths.len(), "Indexed site");
        Self { paths }
    }

    fn exists(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        self.paths.contains(path) || (!path.ends_with('/') && self.paths.contains(&format!("{path}/")))
    }

    fn is_dir(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        if path.ends_with('/') {
            self.paths.contains(path)
        } else {
            self.paths.contains(&format!("{path}/"))
        }
    }
}

fn is_ignored(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') && !(entry.depth() == 1 && name == ".well-known")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.html"), "<p>home</p>").unwrap();
        fs::create_dir(temp.path().join("blog")).unwrap();
        fs::write(temp.path().join("blog/2024-01-05-first.html"), "---\ntitle: First\n---\nbody").unwrap();
        fs::write(temp.path().join("blog/2024-02-01-second.html"), "second").unwrap();
        fs::write(temp.path().join("blog/notes.txt"), "not a post").unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/config"), "").unwrap();
        fs::create_dir_all(temp.path().join(".well-known/acme-challenge")).unwrap();
        fs::write(temp.path().join(".well-known/acme-challenge/token"), "proof").unwrap();
        temp
    }

    #[test]
    fn test_posts_newest_first() {
        let temp = site();
        for mode in [Mode::Development, Mode::Production] {
            let source = SiteSource::new(temp.path(), mode);
            assert_eq!(
                source.posts(),
                vec!["2024-02-01-second.html", "2024-01-05-first.html"]
            );
        }
    }

    #[test]
    fn test_posts_without_blog_dir() {
        let temp = TempDir::new().unwrap();
        let source = SiteSource::new(temp.path(), Mode::Development);
        assert!(source.posts().is_empty());
    }

    #[test]
    fn test_exists_and_is_dir_agree_across_modes() {
        let temp = site();
        for mode in [Mode::Development, Mode::Production] {
            let source = SiteSource::new(temp.path(), mode);
            assert!(source.exists("index.html"), "{mode:?}");
            assert!(source.exists("blog"), "{mode:?}");
            assert!(source.exists("blog/"), "{mode:?}");
            assert!(source.is_dir("blog"), "{mode:?}");
            assert!(source.is_dir("blog/"), "{mode:?}");
            assert!(!source.is_dir("index.html"), "{mode:?}");
            assert!(!source.exists("missing.html"), "{mode:?}");
            assert!(source.exists(".well-known/acme-challenge/token"), "{mode:?}");
        }
    }

    #[test]
    fn test_production_index_skips_dot_entries() {
        let temp = site();
        let source = SiteSource::new(temp.path(), Mode::Production);
        assert!(!source.exists(".git/config"));
        assert!(!source.exists(".git"));
    }

    #[test]
    fn test_production_index_is_a_snapshot() {
        let temp = site();
        let source = SiteSource::new(temp.path(), Mode::Production);
        fs::write(temp.path().join("late.html"), "late").unwrap();
        assert!(!source.exists("late.html"));

        let source = SiteSource::new(temp.path(), Mode::Development);
        assert!(source.exists("late.html"));
    }

    #[test]
    fn test_load_document() {
        let temp = site();
        let source = SiteSource::new(temp.path(), Mode::Development);

        let doc = source.load_document("blog/2024-01-05-first.html").unwrap();
        assert_eq!(doc.get("title"), Some("First"));
        assert_eq!(doc.content, "body");

        assert!(source.load_document("blog/missing.html").is_none());
        assert!(source.load_document("blog").is_none());
    }
}
