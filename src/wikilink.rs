//! `[[Title|PageName]]` links between wiki pages.

use crate::store::{PageRouter, PageStore, page_name_from_file};
use regex::Regex;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `[[` + one or more non-`]` characters + `]]`. Group 1 is the inner span.
pub static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("wiki link pattern"));

/// A parsed wiki link span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// Visible link text.
    pub title: String,
    /// Target page; defaults to the title.
    pub page_name: String,
}

impl WikiLink {
    /// Parse the content between `[[` and `]]`.
    ///
    /// Everything before the first `|` is the title, everything after it is
    /// the page name. Both are trimmed; an empty page name falls back to the
    /// title. Nothing before the `|` means the link starts after it, so
    /// `|Page` links `Page` to `Page`.
    pub fn parse(inner: &str) -> Self {
        let (title, page_name) = match inner.split_once('|') {
            Some((t, p)) if t.trim().is_empty() && !p.trim().is_empty() => return Self::parse(p),
            Some((t, p)) => (t.trim(), p.trim()),
            None => (inner.trim(), ""),
        };
        let page_name = if page_name.is_empty() { title } else { page_name };
        Self {
            title: title.to_string(),
            page_name: page_name.to_string(),
        }
    }
}

/// Case-folded page names known to the store.
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    names: HashSet<String>,
}

impl PageSet {
    pub fn from_store(store: &dyn PageStore) -> Self {
        match store.list_files() {
            Ok(files) => Self::from_files(files.iter().map(String::as_str)),
            Err(e) => {
                log::warn!("page store unavailable, treating every wiki link as missing: {e}");
                Self::default()
            }
        }
    }

    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a str>) -> Self {
        let names: HashSet<String> = files
            .into_iter()
            .filter_map(page_name_from_file)
            .map(str::to_lowercase)
            .collect();
        log::debug!("page set built with {} pages", names.len());
        Self { names }
    }

    pub fn contains(&self, page_name: &str) -> bool {
        self.names.contains(&page_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A resolved link, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub title: String,
    pub href: String,
    pub exists: bool,
}

impl ResolvedLink {
    pub fn to_html(&self, not_found_class: &str) -> String {
        let class = if self.exists {
            String::new()
        } else {
            format!(
                " class=\"{}\"",
                html_escape::encode_double_quoted_attribute(not_found_class)
            )
        };
        format!(
            "<a href=\"{}\"{}>{}</a>",
            html_escape::encode_double_quoted_attribute(&self.href),
            class,
            html_escape::encode_text(&self.title)
        )
    }
}

/// Resolves wiki links for a single render pass.
///
/// The page set is listed lazily on the first link and reused for the rest
/// of the pass, so a document without wiki links never touches the store.
pub struct WikiLinkResolver<'a> {
    store: &'a dyn PageStore,
    router: &'a dyn PageRouter,
    not_found_class: &'a str,
    pages: OnceCell<PageSet>,
}

impl<'a> WikiLinkResolver<'a> {
    pub fn new(store: &'a dyn PageStore, router: &'a dyn PageRouter, not_found_class: &'a str) -> Self {
        Self {
            store,
            router,
            not_found_class,
            pages: OnceCell::new(),
        }
    }

    fn pages(&self) -> &PageSet {
        self.pages.get_or_init(|| PageSet::from_store(self.store))
    }

    pub fn resolve(&self, link: &WikiLink) -> ResolvedLink {
        ResolvedLink {
            title: link.title.clone(),
            // the literal page name, not re-slugified.
            href: self.router.page_url(&link.page_name),
            exists: self.pages().contains(&link.page_name),
        }
    }

    /// Resolve the inner content of a `[[...]]` span straight to HTML.
    pub fn resolve_link(&self, raw_span: &str) -> String {
        self.resolve(&WikiLink::parse(raw_span))
            .to_html(self.not_found_class)
    }

    pub fn not_found_class(&self) -> &str {
        self.not_found_class
    }
}
