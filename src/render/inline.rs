//! Custom inline span rules layered over the markdown engine.
//!
//! Rules run over the raw source before the engine's own inline grammar gets
//! a say: at each position the earliest match wins, and when two rules match
//! at the same offset the one listed first wins. The caller can veto a match
//! that sits inside something the engine owns outright (code, raw HTML, an
//! existing link); scanning then resumes one character later.

use crate::wikilink::{WIKI_LINK, WikiLink, WikiLinkResolver};
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

/// Output of a rule handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Inline {
    /// Markup written into the document.
    pub html: String,
    /// Plain text contribution, used for heading anchors.
    pub plain: String,
}

/// A claimed source range and what replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub range: Range<usize>,
    pub inline: Inline,
}

type Handler = fn(&Captures<'_>, &WikiLinkResolver<'_>) -> Inline;

struct InlineRule {
    name: &'static str,
    pattern: &'static LazyLock<Regex>,
    handler: Handler,
}

pub(crate) struct InlineRules {
    rules: Vec<InlineRule>,
}

impl Default for InlineRules {
    fn default() -> Self {
        Self {
            rules: vec![InlineRule {
                name: "wiki_link",
                pattern: &WIKI_LINK,
                handler: wiki_link,
            }],
        }
    }
}

impl InlineRules {
    /// Claim non-overlapping spans of `source`, in document order.
    ///
    /// Handlers only run for accepted matches, so a document whose matches
    /// are all vetoed never resolves a link.
    pub fn scan(
        &self,
        source: &str,
        links: &WikiLinkResolver<'_>,
        mut accept: impl FnMut(&Range<usize>) -> bool,
    ) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut pos = 0;

        while pos < source.len() {
            let mut best: Option<(&InlineRule, Captures<'_>)> = None;
            for rule in &self.rules {
                let Some(caps) = rule.pattern.captures_at(source, pos) else {
                    continue;
                };
                let start = caps.get(0).map_or(usize::MAX, |m| m.start());
                let best_start = best
                    .as_ref()
                    .and_then(|(_, c)| c.get(0))
                    .map_or(usize::MAX, |m| m.start());
                if start < best_start {
                    best = Some((rule, caps));
                }
            }

            let Some((rule, caps)) = best else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let range = whole.range();
            if range.is_empty() || !accept(&range) {
                log::trace!("inline rule {} declined {:?}", rule.name, whole.as_str());
                pos = range.start
                    + source[range.start..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                continue;
            }

            log::trace!("inline rule {} matched {:?}", rule.name, whole.as_str());
            spans.push(Span {
                inline: (rule.handler)(&caps, links),
                range,
            });
            pos = whole.end();
        }

        spans
    }
}

fn wiki_link(caps: &Captures<'_>, links: &WikiLinkResolver<'_>) -> Inline {
    // group 1 always participates in a match; an empty span only comes from
    // a pattern change and then degrades to an empty title.
    let inner = caps.get(1).map_or("", |m| m.as_str());
    let link = WikiLink::parse(inner);
    let resolved = links.resolve(&link);
    Inline {
        html: resolved.to_html(links.not_found_class()),
        plain: link.title,
    }
}
