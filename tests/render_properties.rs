use scraper::{Html, Selector};
use std::sync::Arc;
use wiki2html::{MarkdownRenderer, StaticPageStore};

fn renderer(pages: &[&str]) -> MarkdownRenderer {
    MarkdownRenderer::default().with_store(Arc::new(StaticPageStore::new(pages.iter().copied())))
}

fn select<'a>(doc: &'a Html, css: &str) -> Vec<scraper::ElementRef<'a>> {
    let sel = Selector::parse(css).unwrap();
    doc.select(&sel).collect()
}

#[test]
fn headingless_documents_have_no_toc() {
    let r = renderer(&[]);
    for src in ["", "just a paragraph", "- a\n- b\n", "```\n# not a heading\n```\n", "> quote"] {
        let out = r.render(src);
        assert_eq!(out.toc_html, "", "input {src:?}");
        assert_eq!(out.toc.count, 0, "input {src:?}");
    }
}

#[test]
fn heading_count_matches_tree_in_document_order() {
    let src = "# One\n\ntext\n\n## Two\n\n### Three\n\nSetext\n------\n\n###### Six\n";
    let out = renderer(&[]).render(src);

    assert_eq!(out.toc.count, 5);
    assert_eq!(out.toc.tree.len(), 5);
    let got: Vec<(usize, &str, u8)> = out
        .toc
        .tree
        .iter()
        .map(|e| (e.index, e.raw_text.as_str(), e.level))
        .collect();
    assert_eq!(
        got,
        vec![(0, "One", 1), (1, "Two", 2), (2, "Three", 3), (3, "Setext", 2), (4, "Six", 6)]
    );

    let doc = Html::parse_fragment(&out.html);
    let ids: Vec<&str> = select(&doc, "h1, h2, h3, h4, h5, h6")
        .iter()
        .map(|h| h.value().attr("id").unwrap())
        .collect();
    assert_eq!(ids, vec!["toc-0", "toc-1", "toc-2", "toc-3", "toc-4"]);
}

#[test]
fn duplicate_headings_get_numbered_anchors() {
    let out = renderer(&[]).render("# Notes\n\n## Notes\n\n## Notes\n");
    let anchors: Vec<&str> = out.toc.tree.iter().map(|e| e.anchor.as_str()).collect();
    assert_eq!(anchors, vec!["notes", "notes-1", "notes-2"]);

    let doc = Html::parse_fragment(&out.html);
    let targets: Vec<(&str, &str)> = select(&doc, "h1 > a, h2 > a")
        .iter()
        .map(|a| (a.value().attr("id").unwrap(), a.value().attr("href").unwrap()))
        .collect();
    assert_eq!(
        targets,
        vec![("notes", "#notes"), ("notes-1", "#notes-1"), ("notes-2", "#notes-2")]
    );

    // toc links follow the anchors the headings actually received.
    let toc = Html::parse_fragment(&out.toc_html);
    let hrefs: Vec<&str> = select(&toc, "ul.toc_list li a")
        .iter()
        .map(|a| a.value().attr("href").unwrap())
        .collect();
    assert_eq!(hrefs, vec!["#notes", "#notes-1", "#notes-2"]);
}

#[test]
fn toc_markup_skips_deep_levels_but_tree_keeps_them() {
    let out = renderer(&[]).render("# Top\n### Deep\n## Mid\n#### Deeper\n");
    assert_eq!(out.toc.tree.len(), 4);

    let toc = Html::parse_fragment(&out.toc_html);
    let items: Vec<String> = select(&toc, "div.content-toc ul.toc_list > li")
        .iter()
        .map(|li| li.text().collect())
        .collect();
    assert_eq!(items, vec!["Top", "Mid"]);
}

#[test]
fn wiki_link_existence_is_case_insensitive() {
    let present = renderer(&["home.md"]).render("[[Home]]");
    let doc = Html::parse_fragment(&present.html);
    let links = select(&doc, "a");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].value().attr("href"), Some("/Home"));
    assert_eq!(links[0].value().attr("class"), None);

    let absent = renderer(&["elsewhere.md"]).render("[[Home]]");
    let doc = Html::parse_fragment(&absent.html);
    let links = select(&doc, "a.notfound");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].value().attr("href"), Some("/Home"));
    assert_eq!(links[0].text().collect::<String>(), "Home");
}

#[test]
fn display_text_and_target_are_independent() {
    let out = renderer(&["ActualPage.md"]).render("[[Display Text|ActualPage]] and [[ActualPage|Other]]");
    let doc = Html::parse_fragment(&out.html);
    let links = select(&doc, "a");
    assert_eq!(links.len(), 2);

    assert_eq!(links[0].text().collect::<String>(), "Display Text");
    assert_eq!(links[0].value().attr("href"), Some("/ActualPage"));
    assert_eq!(links[0].value().attr("class"), None);

    assert_eq!(links[1].text().collect::<String>(), "ActualPage");
    assert_eq!(links[1].value().attr("href"), Some("/Other"));
    assert_eq!(links[1].value().attr("class"), Some("notfound"));
}

fn only_link(html: &str) -> (String, Option<String>, Option<String>) {
    let doc = Html::parse_fragment(html);
    let links = select(&doc, "a");
    assert_eq!(links.len(), 1, "{html}");
    let a = links[0].value();
    (
        links[0].text().collect(),
        a.attr("href").map(str::to_string),
        a.attr("class").map(str::to_string),
    )
}

#[test]
fn wiki_links_take_precedence_over_inline_markup() {
    let r = renderer(&["Home.md", "Vec<T>.md"]);

    let out = r.render("[[Go *home*|Home]]");
    assert_eq!(
        only_link(&out.html),
        ("Go *home*".to_string(), Some("/Home".to_string()), None)
    );
    assert!(!out.html.contains("<em>"), "{}", out.html);

    let out = r.render("[[Vec<T>]]");
    assert_eq!(
        only_link(&out.html),
        ("Vec<T>".to_string(), Some("/Vec%3CT%3E".to_string()), None)
    );

    let out = r.render("[[Home|`code`]]");
    assert_eq!(
        only_link(&out.html),
        (
            "Home".to_string(),
            Some("/%60code%60".to_string()),
            Some("notfound".to_string())
        )
    );
    assert!(!out.html.contains("<code>"), "{}", out.html);

    for out in [
        r.render("[[Go *home*|Home]]"),
        r.render("[[Vec<T>]]"),
        r.render("[[Home|`code`]]"),
    ] {
        assert!(!out.html.contains("[["), "{}", out.html);
        assert!(!out.html.contains("]]"), "{}", out.html);
    }
}

#[test]
fn wiki_link_may_wrap_onto_the_next_line() {
    let out = renderer(&["Home.md"]).render("see [[Home\nPage]] here\n");
    let (text, href, class) = only_link(&out.html);
    assert_eq!(text, "Home\nPage");
    assert_eq!(href.as_deref(), Some("/Home%0APage"));
    assert_eq!(class.as_deref(), Some("notfound"));
    assert!(out.html.starts_with("<p>see <a "), "{}", out.html);
    assert!(out.html.ends_with("</a> here</p>\n"), "{}", out.html);
}

#[test]
fn wiki_link_does_not_cross_paragraphs() {
    let out = renderer(&["Home.md"]).render("[[Home\n\nPage]]\n");
    assert_eq!(out.html, "<p>[[Home</p>\n<p>Page]]</p>\n");
}

#[test]
fn leading_pipe_links_the_remainder() {
    let out = renderer(&["Page.md"]).render("[[|Page]]");
    assert_eq!(out.html, "<p><a href=\"/Page\">Page</a></p>\n");
}

#[test]
fn wiki_link_wins_over_reference_definition() {
    let out = renderer(&[]).render("[[Page]]\n\n[Page]: http://example.com\n");
    assert_eq!(
        only_link(&out.html),
        (
            "Page".to_string(),
            Some("/Page".to_string()),
            Some("notfound".to_string())
        )
    );
}

#[test]
fn escaped_and_code_brackets_stay_literal() {
    let r = renderer(&["Home.md"]);
    let out = r.render("\\[[Home]] and `[[Home]]` and <span title=\"[[Home]]\">x</span>");
    assert!(!out.html.contains("href=\"/Home\""), "{}", out.html);
    assert!(out.html.contains("<code>[[Home]]</code>"), "{}", out.html);

    // a refused candidate does not hide a later link in the same run.
    let out = r.render("`[[x` [[Home]]");
    assert!(out.html.contains("<code>[[x</code>"), "{}", out.html);
    assert_eq!(only_link(&out.html).1.as_deref(), Some("/Home"));
}

#[test]
fn wiki_link_inside_heading_and_table_cell() {
    let out = renderer(&["Home.md"]).render("# See [[Go *home*|Home]]\n\n| a |\n|---|\n| [[Home]] |\n");
    let entry = &out.toc.tree[0];
    assert_eq!(entry.raw_text, "See Go *home*");
    assert_eq!(entry.anchor, "see-go-home");

    let doc = Html::parse_fragment(&out.html);
    assert_eq!(select(&doc, "h1 a[href=\"/Home\"]").len(), 1, "{}", out.html);
    assert_eq!(select(&doc, "td a[href=\"/Home\"]").len(), 1, "{}", out.html);

    // the toc entry is plain text, never a link inside a link.
    let toc = Html::parse_fragment(&out.toc_html);
    let items = select(&toc, "li a");
    assert_eq!(items.len(), 1, "{}", out.toc_html);
    assert_eq!(items[0].text().collect::<String>(), "See Go *home*");
}

#[test]
fn piped_wiki_link_in_table_cell_is_split_by_the_table() {
    let out = renderer(&["Home.md"]).render("| a |\n|---|\n| [[Title|Home]] |\n");
    let doc = Html::parse_fragment(&out.html);
    assert!(select(&doc, "a").is_empty(), "{}", out.html);
    assert!(out.html.contains("<td>[[Title</td>"), "{}", out.html);
}

#[test]
fn unknown_language_block_is_labeled_and_escaped() {
    let out = renderer(&[]).render("```foobarlang\nlet x = \"<y>\";\n```\n");
    assert!(
        out.html
            .contains("<pre><code>foobarlang\nlet x = \"&lt;y&gt;\";</code></pre>"),
        "{}",
        out.html
    );
}

#[test]
fn untagged_block_is_trimmed_and_escaped() {
    let out = renderer(&[]).render("```\n\n   a && b   \n\n```\n");
    assert!(out.html.contains("<pre><code>a &amp;&amp; b</code></pre>"), "{}", out.html);
}

#[test]
fn rendering_twice_is_identical() {
    let src = "# A\n## A\n\nSee [[A]] and [[B|b]].\n\n```python\nprint(1)\n```\n";
    let r = renderer(&["A.md"]);
    let first = r.render(src);
    let second = r.render(src);
    assert_eq!(first, second);
}

#[test]
fn interleaved_passes_do_not_share_state() {
    let r = renderer(&[]);
    let a1 = r.render("# Same\n# Same\n");
    let b = r.render("# Same\n# Other\n");
    let a2 = r.render("# Same\n# Same\n");

    assert_eq!(a1, a2);
    assert_eq!(b.toc.tree[0].anchor, "same");
    assert_eq!(b.toc.tree[0].index, 0);
    assert_eq!(b.toc.anchors.len(), 2);
}

#[test]
fn concurrent_renders_are_isolated() {
    let r = renderer(&["Home.md"]);
    let expected: Vec<_> = (0..8)
        .map(|i| r.render(&format!("# Title\n\n{}\n# Title\n[[Home]]\n", "## Sub\n".repeat(i))))
        .collect();

    let shared = &r;
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                s.spawn(move || {
                    let mut outs = Vec::new();
                    for _ in 0..20 {
                        outs.push(shared.render(&format!(
                            "# Title\n\n{}\n# Title\n[[Home]]\n",
                            "## Sub\n".repeat(i)
                        )));
                    }
                    (i, outs)
                })
            })
            .collect();
        for h in handles {
            let (i, outs) = h.join().unwrap();
            for out in outs {
                assert_eq!(out, expected[i]);
                assert_eq!(out.toc.count, i + 2);
            }
        }
    });
}

#[test]
fn generic_markdown_passes_through() {
    let src = "*em* **strong** ~~gone~~\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n> quote\n\n![alt](img.png) [link](http://example.com)\n";
    let out = renderer(&[]).render(src);
    let doc = Html::parse_fragment(&out.html);
    assert_eq!(select(&doc, "em").len(), 1);
    assert_eq!(select(&doc, "strong").len(), 1);
    assert_eq!(select(&doc, "del").len(), 1);
    assert_eq!(select(&doc, "table td").len(), 2);
    assert_eq!(select(&doc, "blockquote").len(), 1);
    assert_eq!(select(&doc, "img[src='img.png']").len(), 1);
    assert_eq!(select(&doc, "a[href='http://example.com']").len(), 1);
}
