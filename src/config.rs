//! Renderer configuration, loadable from YAML.
//!
//! ```yaml
//! url_prefix: /wiki/
//! toc_max_level: 2
//! not_found_class: notfound
//! highlight_theme: InspiredGitHub
//! extensions:
//!   tables: true
//!   tasklists: true
//! ```

use crate::error::{Error, Result};
use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options that control rendering decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Prefix joined with the page name by the stock router.
    pub url_prefix: String,

    /// Deepest heading level emitted into the TOC markup. Deeper headings
    /// are still recorded in the heading tree.
    pub toc_max_level: u8,

    /// CSS class applied to wiki links whose target page does not exist.
    pub not_found_class: String,

    /// syntect theme used when generating the highlight stylesheet.
    pub highlight_theme: String,

    pub extensions: Extensions,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/".to_string(),
            toc_max_level: 2,
            not_found_class: "notfound".to_string(),
            highlight_theme: "InspiredGitHub".to_string(),
            extensions: Extensions::default(),
        }
    }
}

/// Markdown engine extensions on top of CommonMark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Extensions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: false,
        }
    }
}

impl Extensions {
    /// Engine options for these extensions. The engine's own wiki-link
    /// syntax stays off; `[[...]]` spans are handled by our inline rules.
    pub fn to_options(self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

impl RenderConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // an empty file means "all defaults".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
