//! Markdown -> HTML renderer with wiki extensions.
//!
//! The markdown grammar itself is pulldown-cmark's. This module rewrites its
//! event stream before handing it to the stock HTML writer:
//! - headings become anchored, numbered headers and are recorded for the TOC,
//! - code blocks go through the syntax highlighter,
//! - custom inline spans (`[[Title|Page]]`) are matched on the source first
//!   and replace whatever the engine parsed inside them.
//!
//! Every call to [`MarkdownRenderer::render`] builds its own [`RenderContext`],
//! so a single renderer can be shared between threads and no heading or
//! anchor state carries over from one document to the next.

mod inline;

use crate::config::RenderConfig;
use crate::highlight::CodeHighlighter;
use crate::store::{PageRouter, PageStore, PrefixRouter, StaticPageStore};
use crate::toc::{Toc, TocCollector, heading_html, render_toc};
use crate::wikilink::WikiLinkResolver;
use inline::{Inline, InlineRules, Span};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    /// Rendered document body.
    pub html: String,
    /// TOC markup; empty for headingless documents.
    pub toc_html: String,
    /// Heading tree collected during the pass.
    pub toc: Toc,
}

impl RenderOutput {
    /// `(html, toc_html)`.
    pub fn into_pair(self) -> (String, String) {
        (self.html, self.toc_html)
    }
}

/// Per-pass state. Created fresh for every render and dropped afterwards.
struct RenderContext<'r> {
    toc: TocCollector,
    links: WikiLinkResolver<'r>,
}

struct PendingHeading<'a> {
    level: u8,
    events: Vec<Event<'a>>,
    plain: String,
}

struct PendingCode {
    lang: Option<String>,
    code: String,
}

pub struct MarkdownRenderer {
    config: RenderConfig,
    options: Options,
    highlighter: CodeHighlighter,
    store: Arc<dyn PageStore>,
    router: Arc<dyn PageRouter>,
    rules: InlineRules,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl MarkdownRenderer {
    /// A renderer with an empty page store and a router built from
    /// `config.url_prefix`.
    pub fn new(config: RenderConfig) -> Self {
        let router = PrefixRouter::new(config.url_prefix.clone());
        Self {
            options: config.extensions.to_options(),
            config,
            highlighter: CodeHighlighter::new(),
            store: Arc::new(StaticPageStore::default()),
            router: Arc::new(router),
            rules: InlineRules::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn PageStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_router(mut self, router: Arc<dyn PageRouter>) -> Self {
        self.router = router;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn highlighter(&self) -> &CodeHighlighter {
        &self.highlighter
    }

    pub fn render(&self, text: &str) -> RenderOutput {
        let mut ctx = RenderContext {
            toc: TocCollector::new(),
            links: WikiLinkResolver::new(
                self.store.as_ref(),
                self.router.as_ref(),
                &self.config.not_found_class,
            ),
        };

        let events = self.rewrite_events(text, &mut ctx);
        let mut body = String::with_capacity(text.len() + text.len() / 2);
        html::push_html(&mut body, events.into_iter());

        let toc = ctx.toc.into_toc();
        let toc_html = render_toc(&toc, self.config.toc_max_level);
        log::trace!(
            "rendered {} bytes into {} bytes, {} headings",
            text.len(),
            body.len(),
            toc.count
        );

        RenderOutput {
            html: body,
            toc_html,
            toc,
        }
    }

    fn rewrite_events<'a>(&self, text: &'a str, ctx: &mut RenderContext<'_>) -> Vec<Event<'a>> {
        let events: Vec<(Event<'a>, Range<usize>)> =
            Parser::new_ext(text, self.options).into_offset_iter().collect();
        let spans = self
            .rules
            .scan(text, &ctx.links, |m| claimable(&events, text, m));
        let mut emitted = vec![false; spans.len()];

        let mut out: Vec<Event<'a>> = Vec::new();
        let mut heading: Option<PendingHeading<'a>> = None;
        let mut code: Option<PendingCode> = None;

        for (event, range) in events {
            // code block bodies are collected verbatim until the block ends.
            if let Some(pending) = code.as_mut() {
                match event {
                    Event::Text(t) => pending.code.push_str(&t),
                    Event::End(TagEnd::CodeBlock) => {
                        let html = self
                            .highlighter
                            .highlight(&pending.code, pending.lang.as_deref());
                        code = None;
                        emit(&mut out, &mut heading, Event::Html(html.into()));
                    }
                    _ => {}
                }
                continue;
            }

            // everything the engine parsed inside a claimed span collapses
            // into the span's markup, written once at its first event.
            // (a block whose range is exactly the span still wraps it.)
            let is_tag = matches!(event, Event::Start(_) | Event::End(_));
            let enclosing = enclosing_span(&spans, &range)
                .filter(|&i| !(is_tag && spans[i].range == range));
            if let Some(i) = enclosing {
                if !matches!(event, Event::End(_)) && !emitted[i] {
                    emitted[i] = true;
                    emit_inline(&mut out, &mut heading, &spans[i].inline);
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code = Some(PendingCode {
                        lang: code_lang(&kind),
                        code: String::new(),
                    });
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some(PendingHeading {
                        level: level as u8,
                        events: Vec::new(),
                        plain: String::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(h) = heading.take() {
                        out.push(Event::Html(finish_heading(h, &mut ctx.toc).into()));
                    }
                }
                Event::Text(t) => {
                    let first = spans.partition_point(|s| s.range.end <= range.start);
                    let overlapping = spans[first..]
                        .iter()
                        .take_while(|s| s.range.start < range.end)
                        .count();
                    if overlapping == 0 {
                        push_plain(&mut heading, &t);
                        emit(&mut out, &mut heading, Event::Text(t));
                        continue;
                    }

                    // a run straddling span edges is its own source slice
                    // (`claimable` checked), so it can be cut by offset.
                    let mut cursor = range.start;
                    for i in first..first + overlapping {
                        let span = &spans[i].range;
                        if span.start > cursor {
                            push_text(&mut out, &mut heading, &text[cursor..span.start]);
                        }
                        if !emitted[i] {
                            emitted[i] = true;
                            emit_inline(&mut out, &mut heading, &spans[i].inline);
                        }
                        cursor = cursor.max(span.end);
                    }
                    if cursor < range.end {
                        push_text(&mut out, &mut heading, &text[cursor..range.end]);
                    }
                }
                Event::Code(c) => {
                    push_plain(&mut heading, &c);
                    emit(&mut out, &mut heading, Event::Code(c));
                }
                other => emit(&mut out, &mut heading, other),
            }
        }

        out
    }
}

/// Whether a rule match at `m` may take over that stretch of source.
///
/// The match has to sit inside a single run of inline content, must not
/// start on an escaped bracket and must not land inside code, raw HTML or an
/// existing link. Inline constructs that lie
/// wholly inside the match are swallowed by it; anything cut in half by one
/// of its edges refuses the match, so the event stream stays balanced.
fn claimable(events: &[(Event<'_>, Range<usize>)], source: &str, m: &Range<usize>) -> bool {
    // `\[[x]]`: the engine keeps an escaped bracket as text of its own.
    let backslashes = source[..m.start]
        .bytes()
        .rev()
        .take_while(|&b| b == b'\\')
        .count();
    if backslashes % 2 == 1 {
        return false;
    }

    for (event, r) in events {
        if r.end <= m.start || r.start >= m.end {
            continue;
        }
        let covers = r.start <= m.start && m.end <= r.end;
        let inside = m.start <= r.start && r.end <= m.end;
        let ok = match event {
            // ends carry their start's range.
            Event::End(_) => true,
            Event::Start(tag) if covers => !matches!(
                tag,
                Tag::CodeBlock(_)
                    | Tag::HtmlBlock
                    | Tag::MetadataBlock(_)
                    | Tag::Link { .. }
                    | Tag::Image { .. }
            ),
            Event::Start(tag) => {
                inside
                    && matches!(
                        tag,
                        Tag::Emphasis
                            | Tag::Strong
                            | Tag::Strikethrough
                            | Tag::Link { .. }
                            | Tag::Image { .. }
                    )
            }
            Event::Text(t) => inside || source.get(r.clone()) == Some(&**t),
            _ => inside,
        };
        if !ok {
            return false;
        }
    }
    true
}

/// Index of the span that strictly contains the event range `r`.
fn enclosing_span(spans: &[Span], r: &Range<usize>) -> Option<usize> {
    let i = spans.partition_point(|s| s.range.start <= r.start);
    let span = &spans.get(i.checked_sub(1)?)?.range;
    let within = span.start <= r.start && r.end <= span.end;
    let touches = r.start < span.end && r.end > span.start;
    (within && touches).then_some(i - 1)
}

fn emit_inline<'a>(out: &mut Vec<Event<'a>>, heading: &mut Option<PendingHeading<'a>>, inline: &Inline) {
    push_plain(heading, &inline.plain);
    emit(out, heading, Event::InlineHtml(inline.html.clone().into()));
}

fn push_text<'a>(out: &mut Vec<Event<'a>>, heading: &mut Option<PendingHeading<'a>>, text: &'a str) {
    push_plain(heading, text);
    emit(out, heading, Event::Text(text.into()));
}

fn emit<'a>(out: &mut Vec<Event<'a>>, heading: &mut Option<PendingHeading<'a>>, event: Event<'a>) {
    match heading {
        Some(h) => h.events.push(event),
        None => out.push(event),
    }
}

fn push_plain(heading: &mut Option<PendingHeading<'_>>, text: &str) {
    if let Some(h) = heading {
        h.plain.push_str(text);
    }
}

fn finish_heading(heading: PendingHeading<'_>, toc: &mut TocCollector) -> String {
    let mut inner = String::new();
    html::push_html(&mut inner, heading.events.into_iter());
    let (index, anchor) = toc.record_heading(&inner, heading.level, heading.plain.trim());
    heading_html(heading.level, index, &anchor, &inner)
}

/// First word of a fenced block's info string (`rust,ignore` -> `rust`).
fn code_lang(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split(|c: char| c.is_whitespace() || c == ',')
            .find(|s| !s.is_empty())
            .map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}
