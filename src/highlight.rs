//! Syntax-highlighted code blocks.
//!
//! Highlighting is class based: spans carry scope class names and the colors
//! come from a stylesheet scoped under `.highlight`, generated by
//! [`CodeHighlighter::stylesheet`].

use crate::error::{Error, Result};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Wrapper class for highlighted blocks; also the stylesheet scope.
pub const HIGHLIGHT_CLASS: &str = "highlight";

pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    pub fn knows_language(&self, lang: &str) -> bool {
        self.syntax_set.find_syntax_by_token(lang.trim()).is_some()
    }

    /// Render a code block. Never fails: no language gives a plain block, an
    /// unknown language gives a plain block labeled with the language name.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.map(str::trim).filter(|l| !l.is_empty());
        let Some(lang) = lang else {
            return format!(
                "\n<pre><code>{}</code></pre>\n",
                html_escape::encode_text(code.trim())
            );
        };

        match self.highlight_known(code, lang) {
            Some(html) => html,
            None => labeled_block(code, lang),
        }
    }

    fn highlight_known(&self, code: &str, lang: &str) -> Option<String> {
        let Some(syntax) = self.syntax_set.find_syntax_by_token(lang) else {
            log::debug!("no lexer for language {lang:?}, emitting labeled block");
            return None;
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code.trim()) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                log::warn!("highlighting {lang} failed, emitting labeled block: {e}");
                return None;
            }
        }
        Some(format!(
            "<div class=\"{HIGHLIGHT_CLASS}\"><pre>{}</pre></div>\n",
            generator.finalize()
        ))
    }

    /// CSS for `theme`, with every selector scoped under `.highlight `.
    pub fn stylesheet(&self, theme: &str) -> Result<String> {
        let themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .get(theme)
            .ok_or_else(|| Error::UnknownTheme(theme.to_string()))?;
        let css = css_for_theme_with_class_style(theme, ClassStyle::Spaced)?;
        Ok(scope_selectors(&css, &format!(".{HIGHLIGHT_CLASS}")))
    }
}

fn labeled_block(code: &str, lang: &str) -> String {
    format!(
        "\n<pre><code>{}\n{}</code></pre>\n",
        html_escape::encode_text(lang),
        html_escape::encode_text(code.trim())
    )
}

/// Prefix every selector of every rule with `scope`.
fn scope_selectors(css: &str, scope: &str) -> String {
    let mut out = String::with_capacity(css.len() * 2);
    let mut in_comment = false;
    for line in css.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("/*") {
            in_comment = !trimmed.ends_with("*/");
        } else if in_comment {
            in_comment = !trimmed.ends_with("*/");
        } else if let Some(selectors) = trimmed.strip_suffix('{') {
            let scoped: Vec<String> = selectors
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| format!("{scope} {s}"))
                .collect();
            out.push_str(&scoped.join(", "));
            out.push_str(" {\n");
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
