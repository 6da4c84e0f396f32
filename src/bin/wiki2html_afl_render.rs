//! AFL++ fuzz target for `wiki2html`.
//!
//! This binary is intentionally stdin-driven, so it can be used with AFL++.
//! Build and run it via `cargo-afl`:
//!
//! ```bash
//! cargo install cargo-afl
//!
//! cargo afl build --release --features afl_fuzz --bin wiki2html_afl_render
//!
//! mkdir -p fuzz/afl/out
//!
//! cargo afl fuzz \
//!   -i fuzz/afl/in \
//!   -o fuzz/afl/out \
//!   target/release/wiki2html_afl_render
//! ```
//!
//! Rust panics normally unwind and exit with a non-crashing status code.
//! AFL++ only treats crashes as signals/aborts. We therefore catch any unwind
//! and turn it into `abort()`.

use std::io::Read;
use std::sync::Arc;

use wiki2html::{MarkdownRenderer, RenderOutput, StaticPageStore};

const MAX_INPUT_LEN: usize = 1_000_000; // 1MB guardrail; AFL++ will typically cap this anyway.

fn check_output(out: &RenderOutput) {
    assert_eq!(out.toc.count, out.toc.tree.len(), "heading count drifted from tree");
    for (i, entry) in out.toc.tree.iter().enumerate() {
        assert_eq!(entry.index, i, "heading indices out of order");
        assert!((1..=6).contains(&entry.level), "bad heading level {}", entry.level);
    }
    // every anchor a heading got must be reachable from the TOC markup.
    for entry in out.toc.tree.iter().filter(|e| e.level <= 2) {
        let href = format!("href=\"#{}\"", html_escape::encode_double_quoted_attribute(&entry.anchor));
        assert!(out.toc_html.contains(&href), "toc misses {href}");
    }
    assert_eq!(out.toc_html.is_empty(), out.toc.count == 0);
}

fn run_one_input(renderer: &MarkdownRenderer, data: &[u8]) {
    if data.len() > MAX_INPUT_LEN {
        return;
    }

    // lossy conversion keeps the harness total (no early returns that reduce coverage).
    let src = String::from_utf8_lossy(data).to_string();

    let first = renderer.render(&src);
    check_output(&first);

    // a second pass over the same input must not see state from the first.
    let second = renderer.render(&src);
    assert_eq!(first, second, "render is not idempotent");
}

fn main() {
    let mut data = Vec::new();
    std::io::stdin().read_to_end(&mut data).unwrap();

    let renderer = MarkdownRenderer::default()
        .with_store(Arc::new(StaticPageStore::new(["Home.md", "docs/Setup.md"])));

    // convert any panic into an abort().
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        run_one_input(&renderer, &data)
    }));
    if result.is_err() {
        std::process::abort();
    }
}
