//! Heading bookkeeping and table-of-contents markup.
//!
//! A [`TocCollector`] lives for exactly one render pass. It numbers headings
//! in document order, allocates their anchors, and keeps every heading in the
//! tree; [`render_toc`] later decides which levels make it into the markup.

mod anchor;

pub use anchor::AnchorAllocator;

use serde::Serialize;
use std::collections::BTreeMap;

/// One recorded heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Position in document order, starting at 0. Also the `toc-<index>` DOM id.
    pub index: usize,

    /// Inline-rendered heading content (HTML).
    pub text: String,

    /// Heading level, 1-6.
    pub level: u8,

    /// Plain heading text as written, without markup.
    pub raw_text: String,

    /// Anchor allocated to this heading when it was rendered.
    pub anchor: String,
}

/// Read-only snapshot of a finished pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toc {
    pub count: usize,
    pub tree: Vec<TocEntry>,
    pub anchors: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct TocCollector {
    count: usize,
    tree: Vec<TocEntry>,
    anchors: AnchorAllocator,
}

impl TocCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading and return its `(index, anchor)`.
    ///
    /// The anchor is slugified from `raw_text` so markup in the rendered
    /// `text` never ends up in a fragment identifier.
    pub fn record_heading(&mut self, text: &str, level: u8, raw_text: &str) -> (usize, String) {
        let index = self.count;
        let anchor = self.anchors.allocate(raw_text);
        self.tree.push(TocEntry {
            index,
            text: text.to_string(),
            level,
            raw_text: raw_text.to_string(),
            anchor: anchor.clone(),
        });
        self.count += 1;
        (index, anchor)
    }

    pub fn toc(&self) -> Toc {
        Toc {
            count: self.count,
            tree: self.tree.clone(),
            anchors: self.anchors.counts().clone(),
        }
    }

    /// Consume the collector without cloning the tree.
    pub fn into_toc(self) -> Toc {
        Toc {
            count: self.count,
            anchors: self.anchors.counts().clone(),
            tree: self.tree,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.tree.clear();
        self.anchors.reset();
    }
}

/// Markup for a rendered heading: a self-linking anchor inside a header
/// element whose DOM id is the positional `toc-<index>`.
pub fn heading_html(level: u8, index: usize, anchor: &str, text: &str) -> String {
    format!(
        "<h{level} id=\"toc-{index}\"><a id=\"{anchor}\" href=\"#{anchor}\">{text}<span class=\"anchor\">&nbsp;</span></a></h{level}>\n",
        anchor = html_escape::encode_double_quoted_attribute(anchor),
    )
}

/// Render the TOC list. Headingless documents produce an empty string.
///
/// Entries deeper than `max_level` are skipped (not nested under their
/// parent). Links use the anchor stored with each entry, so repeated
/// heading texts point at their own disambiguated headings. Entry labels are
/// the plain heading text: rendered text may itself hold links, and an `<a>`
/// cannot nest inside another.
pub fn render_toc(toc: &Toc, max_level: u8) -> String {
    if toc.count == 0 {
        return String::new();
    }

    let mut out = String::from("<div class=\"content-toc\"><ul class=\"toc_list\">");
    for entry in &toc.tree {
        if entry.level > max_level {
            continue;
        }
        out.push_str(&format!(
            "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>\n",
            entry.level,
            html_escape::encode_double_quoted_attribute(&entry.anchor),
            html_escape::encode_text(&entry.raw_text)
        ));
    }
    out.push_str("</ul></div>");
    out
}
