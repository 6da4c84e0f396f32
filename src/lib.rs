pub mod config;
pub mod error;
pub mod highlight;
pub mod render;
pub mod slug;
pub mod store;
pub mod toc;
pub mod wikilink;

pub use config::RenderConfig;
pub use error::{Error, Result};
pub use render::{MarkdownRenderer, RenderOutput};
pub use store::{DirPageStore, PageRouter, PageStore, PrefixRouter, StaticPageStore};

use std::sync::Arc;

/// Render wiki-flavored markdown in one call, returning `(html, toc_html)`.
///
/// This builds a fresh [`MarkdownRenderer`] (and loads the syntax set) every
/// time. Servers rendering many pages should build one renderer and share it.
pub fn render_markdown(
    text: &str,
    store: Arc<dyn PageStore>,
    router: Arc<dyn PageRouter>,
) -> (String, String) {
    MarkdownRenderer::default()
        .with_store(store)
        .with_router(router)
        .render(text)
        .into_pair()
}
