//! Page storage and routing collaborators.
//!
//! The renderer only needs two things from the rest of a wiki: the list of
//! page identifiers (to flag links to missing pages) and a URL for a page
//! name. Both are traits so a server can plug in its own storage and routes.

use crate::error::{Error, Result};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Extension that marks a stored file as a page.
pub const PAGE_EXTENSION: &str = ".md";

pub trait PageStore: Send + Sync {
    /// All stored identifiers as store-relative, `/`-separated paths.
    /// Non-page files (attachments) may be included; callers filter them.
    fn list_files(&self) -> Result<Vec<String>>;
}

pub trait PageRouter: Send + Sync {
    fn page_url(&self, page_name: &str) -> String;
}

/// Display page name for a stored identifier, or `None` for non-page files.
///
/// `Home.md` -> `Home`, `Projects/Alpha.md` -> `Projects/Alpha`.
pub fn page_name_from_file(identifier: &str) -> Option<&str> {
    identifier
        .strip_suffix(PAGE_EXTENSION)
        .filter(|name| !name.is_empty())
}

/// A fixed, in-memory list of identifiers.
#[derive(Debug, Clone, Default)]
pub struct StaticPageStore {
    files: Vec<String>,
}

impl StaticPageStore {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

impl PageStore for StaticPageStore {
    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.files.clone())
    }
}

/// Pages stored as files under a directory tree.
#[derive(Debug, Clone)]
pub struct DirPageStore {
    root: PathBuf,
}

impl DirPageStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::PagesDirNotFound(root));
        }
        Ok(Self { root })
    }
}

impl PageStore for DirPageStore {
    fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("skipping unreadable entry under {}: {e}", self.root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let id: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(id.join("/"));
        }
        Ok(files)
    }
}

// path-segment set: `/` stays literal so nested pages keep their structure.
const PAGE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Routes `Page Name` to `<prefix>Page%20Name`.
#[derive(Debug, Clone)]
pub struct PrefixRouter {
    prefix: String,
}

impl PrefixRouter {
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }
}

impl Default for PrefixRouter {
    fn default() -> Self {
        Self::new("/")
    }
}

impl PageRouter for PrefixRouter {
    fn page_url(&self, page_name: &str) -> String {
        format!("{}{}", self.prefix, utf8_percent_encode(page_name, PAGE_PATH))
    }
}
