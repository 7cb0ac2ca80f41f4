//! Integration tests for the crossdoc pipeline.
//!
//! These tests drive the full path from the builder DSL (or builder JSON)
//! through the flow engine to the paginator. They verify:
//! - Blocks stack, split by weight, and size to their text
//! - Content that fits is left alone
//! - Pages split at the right nodes, at every nesting depth
//! - Content order and node counts survive splitting
//! - Ordered lists keep counting on the next page
//! - Bad input is rejected without touching the document

use crossdoc::builder::{BuilderNode, DocBuilder, DocOptions};
use crossdoc::error::CrossdocError;
use crossdoc::geom::{Font, Margin};
use crossdoc::model::{Document, Node, PageSize};
use crossdoc::paginate::{break_page, Paginator};

// ─── Helpers ────────────────────────────────────────────────────

fn make_builder(page_height: f64) -> DocBuilder {
    DocBuilder::new(DocOptions {
        page_size: PageSize::Custom {
            width: 500.0,
            height: page_height,
        },
        page_margin: "0".to_string(),
        ..DocOptions::default()
    })
    .unwrap()
}

fn make_block(parent: &mut BuilderNode, height: f64) {
    parent.div(|d| d.push_min_height(height));
}

fn make_text_block(parent: &mut BuilderNode, height: f64, text: &str) {
    parent.div(|d| {
        d.push_min_height(height);
        d.text(text);
    });
}

fn all_texts(doc: &Document) -> Vec<String> {
    doc.pages
        .iter()
        .flat_map(|p| p.texts())
        .map(str::to_string)
        .collect()
}

fn total_nodes(doc: &Document) -> usize {
    doc.pages.iter().map(|p| p.count_nodes()).sum()
}

/// Lowest leaf edge below `offset`, in page coordinates.
fn content_bottom(nodes: &[Node], offset: f64) -> f64 {
    nodes
        .iter()
        .map(|n| {
            if n.children.is_empty() {
                offset + n.rect.bottom()
            } else {
                content_bottom(&n.children, offset + n.rect.y)
            }
        })
        .fold(0.0, f64::max)
}

/// Six sections, each a title and five paragraphs; text only on leaves.
fn make_report(page_height: f64) -> Document {
    let mut builder = make_builder(page_height);
    builder.page(|page| {
        for s in 0..6 {
            page.div(|section| {
                make_text_block(section, 20.0, &format!("section {s}"));
                for k in 0..5 {
                    make_text_block(section, 25.0, &format!("section {s} paragraph {k}"));
                }
            });
        }
    });
    builder.to_doc().unwrap()
}

// ─── Flow ───────────────────────────────────────────────────────

#[test]
fn test_vertical_stacking_law() {
    let mut builder = make_builder(1000.0);
    builder.page(|page| {
        for (i, h) in [10.0, 25.0, 7.5, 40.0].into_iter().enumerate() {
            page.div(|d| {
                d.push_min_height(h);
                d.margin = Margin {
                    top: i as f64,
                    right: 0.0,
                    bottom: 2.0 * i as f64,
                    left: 0.0,
                };
            });
        }
    });
    let doc = builder.to_doc().unwrap();
    let children = &doc.pages[0].children;
    for k in 0..children.len() - 1 {
        let expected = children[k].rect.bottom() + 2.0 * k as f64 + (k + 1) as f64;
        assert!(
            (children[k + 1].rect.y - expected).abs() < 1e-9,
            "child {} at {} expected {}",
            k + 1,
            children[k + 1].rect.y,
            expected
        );
    }
    let last = children.last().unwrap();
    assert_eq!(doc.pages[0].rect.height, last.rect.bottom() + 6.0);
}

#[test]
fn test_horizontal_row_takes_tallest_child() {
    let mut builder = make_builder(1000.0);
    builder.page(|page| {
        page.horizontal_div(|row| {
            row.div(|c| {
                c.weight(1.0).push_min_height(30.0);
            });
            row.div(|c| {
                c.weight(3.0).push_min_height(90.0);
            });
        });
    });
    let doc = builder.to_doc().unwrap();
    let row = &doc.pages[0].children[0];
    assert_eq!(row.rect.height, 90.0);
    assert_eq!(row.children[0].rect.width, 125.0);
    assert_eq!(row.children[1].rect.x, 125.0);
    assert_eq!(row.children[1].rect.width, 375.0);
}

#[test]
fn test_zero_weight_row_is_rejected() {
    let mut builder = make_builder(1000.0);
    builder.page(|page| {
        page.horizontal_div(|row| {
            row.div(|c| {
                c.weight(0.0);
            });
        });
    });
    let err = builder.to_doc().unwrap_err();
    assert!(matches!(err, CrossdocError::ZeroWeight { .. }));
}

#[test]
fn test_narrow_page_makes_text_taller() {
    let text = "The quick brown fox jumps over the lazy dog while the five boxing \
                wizards jump quickly and a wizard's job is to vex chumps quickly in fog.";
    let height_at = |width: f64| {
        let mut builder = DocBuilder::new(DocOptions {
            page_size: PageSize::Custom {
                width,
                height: 1000.0,
            },
            page_margin: "0".to_string(),
            ..DocOptions::default()
        })
        .unwrap();
        builder.page(|page| {
            page.node("p", |p| {
                p.text(text);
                p.default_font(Font::sized(12.0));
            });
        });
        builder.to_doc().unwrap().pages[0].children[0].rect.height
    };
    let wide = height_at(2000.0);
    let narrow = height_at(150.0);
    assert_eq!(wide, 16.0);
    assert!(narrow > wide);
    assert_eq!(narrow % 16.0, 0.0);
}

#[test]
fn test_flow_is_pure() {
    let mut builder = make_builder(300.0);
    builder.page(|page| {
        page.horizontal_div(|row| {
            for w in [1.0, 2.0, 0.5] {
                row.div(|c| {
                    c.weight(w).push_min_height(10.0 * w);
                });
            }
        });
        make_text_block(page, 12.0, "tail");
    });
    assert_eq!(builder.to_doc().unwrap(), builder.to_doc().unwrap());
}

// ─── Pagination scenarios ───────────────────────────────────────

#[test]
fn test_three_blocks_split_after_two() {
    let mut builder = make_builder(100.0);
    builder.page(|page| {
        make_text_block(page, 40.0, "one");
        make_text_block(page, 40.0, "two");
        make_text_block(page, 40.0, "three");
    });
    let mut doc = builder.to_doc().unwrap();
    Paginator::new().with_num_levels(0).run(&mut doc).unwrap();

    assert_eq!(doc.pages.len(), 2);
    assert_eq!(doc.pages[0].texts(), vec!["one", "two"]);
    assert_eq!(doc.pages[0].rect.height, 80.0);
    assert_eq!(doc.pages[1].texts(), vec!["three"]);
    assert_eq!(doc.pages[1].children[0].rect.y, 0.0);
}

#[test]
fn test_content_that_fits_is_unchanged() {
    let mut builder = make_builder(100.0);
    builder.page(|page| {
        make_block(page, 60.0);
        make_block(page, 40.0);
    });
    let mut doc = builder.to_doc().unwrap();
    let original = doc.clone();
    Paginator::new().run(&mut doc).unwrap();
    assert_eq!(doc, original);
}

#[test]
fn test_empty_page_is_unchanged() {
    let mut builder = make_builder(100.0);
    builder.page(|_| {});
    let mut doc = builder.to_doc().unwrap();
    let original = doc.clone();
    Paginator::new().run(&mut doc).unwrap();
    assert_eq!(doc, original);

    let mut builder = make_builder(100.0);
    builder.page(|page| {
        make_block(page, 0.0);
        make_block(page, 500.0);
    });
    let mut doc = builder.to_doc().unwrap();
    let original = doc.clone();
    Paginator::new().run(&mut doc).unwrap();
    assert_eq!(doc, original);
}

#[test]
fn test_clean_break_on_boundary() {
    let mut builder = make_builder(100.0);
    builder.page(|page| {
        for _ in 0..6 {
            make_block(page, 50.0);
        }
    });
    let mut doc = builder.to_doc().unwrap();
    Paginator::new().run(&mut doc).unwrap();
    assert_eq!(doc.pages.len(), 3);
    for page in &doc.pages {
        assert_eq!(page.children.len(), 2);
        assert_eq!(page.children[0].rect.y, 0.0);
        assert_eq!(page.children[1].rect.y, 50.0);
    }
}

#[test]
fn test_ordered_list_continues_numbering() {
    let mut builder = make_builder(100.0);
    builder.page(|page| {
        page.node("ol", |ol| {
            for i in 1..=5 {
                ol.node("li", |li| {
                    li.node("p", |p| {
                        p.push_min_height(30.0);
                        p.text(format!("item {i}"));
                    });
                });
            }
        });
    });
    let mut doc = builder.to_doc().unwrap();
    Paginator::new().with_num_levels(2).run(&mut doc).unwrap();

    assert_eq!(doc.pages.len(), 2);

    let before = &doc.pages[0].children[0];
    assert_eq!(before.tag, "OL");
    assert_eq!(before.children.len(), 4);
    assert!(before.children[3].children.is_empty());
    assert_eq!(doc.pages[0].texts(), vec!["item 1", "item 2", "item 3"]);

    let after = &doc.pages[1].children[0];
    assert_eq!(after.start, Some(4));
    assert_eq!(after.rect.y, 0.0);
    assert_eq!(after.rect.height, 60.0);
    assert_eq!(after.children[0].rect.y, 0.0);
    assert_eq!(after.children[1].rect.y, 30.0);
    assert_eq!(doc.pages[1].texts(), vec!["item 4", "item 5"]);
}

#[test]
fn test_nested_sections_split_inside() {
    let mut doc = make_report(200.0);
    let original_texts = all_texts(&doc);
    Paginator::new().run(&mut doc).unwrap();

    assert!(doc.pages.len() > 1);
    assert_eq!(all_texts(&doc), original_texts);

    // Section 1 straddles the first boundary and is cut after paragraph 0.
    // Its copy is tight, the page root still ends at the section's full box.
    let first = &doc.pages[0];
    assert_eq!(first.children.len(), 2);
    assert_eq!(first.children[1].children.len(), 2);
    assert_eq!(first.children[1].rect.height, 45.0);
    assert_eq!(first.rect.height, 290.0);
    assert_eq!(content_bottom(&first.children, 0.0), 190.0);
    let second = &doc.pages[1];
    assert_eq!(second.texts()[0], "section 1 paragraph 1");
    assert_eq!(second.children[0].rect.y, 0.0);
    assert_eq!(second.children[0].rect.height, 100.0);
    assert_eq!(second.children[1].rect.y, 100.0);

    let (last, rest) = doc.pages.split_last().unwrap();
    for page in rest {
        let bottom = content_bottom(&page.children, 0.0);
        assert!(bottom <= 200.0, "page content ends at {bottom}");
    }
    assert!(!last.children.is_empty());
}

#[test]
fn test_header_and_footer_shrink_the_page() {
    let mut builder = make_builder(200.0);
    builder.header(|h| {
        make_block(h, 20.0);
    });
    builder.footer(|f| {
        make_block(f, 30.0);
    });
    builder.page(|page| {
        for _ in 0..6 {
            make_block(page, 50.0);
        }
    });
    let mut doc = builder.to_doc().unwrap();
    assert_eq!(doc.content_height(), 150.0);
    Paginator::new().run(&mut doc).unwrap();
    assert_eq!(doc.pages.len(), 2);
    assert_eq!(doc.pages[0].children.len(), 3);
    assert_eq!(doc.pages[1].children.len(), 3);
}

#[test]
fn test_narrow_columns_are_not_split() {
    let mut builder = make_builder(100.0);
    builder.page(|page| {
        make_block(page, 40.0);
        page.horizontal_div(|row| {
            make_block(row, 200.0);
            make_block(row, 150.0);
        });
    });
    let mut doc = builder.to_doc().unwrap();
    Paginator::new().run(&mut doc).unwrap();

    assert_eq!(doc.pages.len(), 2);
    assert_eq!(doc.pages[0].children.len(), 1);
    let row = &doc.pages[1].children[0];
    assert_eq!(row.rect.y, 0.0);
    assert_eq!(row.children.len(), 2);
    assert_eq!(row.rect.height, 200.0);
}

// ─── Bounds and invariants ──────────────────────────────────────

#[test]
fn test_max_pages_keeps_remainder_on_last_page() {
    let mut builder = make_builder(100.0);
    builder.page(|page| {
        for i in 0..50 {
            make_text_block(page, 40.0, &format!("block {i}"));
        }
    });
    let mut doc = builder.to_doc().unwrap();
    let original_texts = all_texts(&doc);

    let mut capped = doc.clone();
    Paginator::new().with_max_pages(3).run(&mut capped).unwrap();
    assert_eq!(capped.pages.len(), 3);
    assert_eq!(capped.pages[2].children.len(), 46);
    assert_eq!(all_texts(&capped), original_texts);

    Paginator::new().run(&mut doc).unwrap();
    assert_eq!(doc.pages.len(), 10);
    assert_eq!(doc.pages[9].children.len(), 32);
    assert_eq!(all_texts(&doc), original_texts);
}

#[test]
fn test_single_page_policy() {
    let mut doc = make_report(200.0);
    let original = doc.clone();
    Paginator::new().with_max_pages(1).run(&mut doc).unwrap();
    assert_eq!(doc, original);
}

#[test]
fn test_node_count_without_descent() {
    let mut doc = make_report(200.0);
    let original_nodes = total_nodes(&doc);
    Paginator::new().with_num_levels(0).run(&mut doc).unwrap();
    assert!(doc.pages.len() > 1);
    assert_eq!(total_nodes(&doc), original_nodes);
}

#[test]
fn test_node_count_law_per_break() {
    for path in [vec![2], vec![1, 2], vec![1, 2, 0]] {
        let mut builder = make_builder(1000.0);
        builder.page(|page| {
            for _ in 0..3 {
                page.div(|outer| {
                    for _ in 0..3 {
                        outer.div(|inner| {
                            for _ in 0..2 {
                                make_block(inner, 10.0);
                            }
                        });
                    }
                });
            }
        });
        let mut doc = builder.to_doc().unwrap();
        let mut page = doc.pages.remove(0);
        let original = page.count_nodes();

        let before = break_page(&mut page, &path);
        assert_eq!(
            before.count_nodes() + page.count_nodes(),
            original + path.len() - 1,
            "path {path:?}"
        );
    }
}

#[test]
fn test_two_pages_are_rejected() {
    let mut builder = make_builder(100.0);
    builder.page(|page| make_block(page, 300.0));
    builder.page(|page| make_block(page, 300.0));
    let mut doc = builder.to_doc().unwrap();
    let original = doc.clone();

    let err = Paginator::new().run(&mut doc).unwrap_err();
    assert!(matches!(err, CrossdocError::PageCount(2)));
    assert_eq!(doc, original);
}

#[test]
fn test_shallow_copies_do_not_share_children() {
    let mut doc = make_report(200.0);
    Paginator::new().run(&mut doc).unwrap();
    let first: &Node = &doc.pages[0].children[1];
    let second: &Node = &doc.pages[1].children[0];
    assert_eq!(first.tag, second.tag);
    assert_eq!(first.children.len(), 2);
    assert_eq!(second.children.len(), 4);

    let mut texts = vec![];
    first.collect_text(&mut texts);
    assert_eq!(texts, vec!["section 1", "section 1 paragraph 0"]);
}

// ─── JSON ───────────────────────────────────────────────────────

const SOURCE: &str = r##"{
    "page_size": { "custom": { "width": 400, "height": 300 } },
    "page_margin": "20pt",
    "header": { "tag": "HEADER", "children": [ { "tag": "DIV", "min_height": 20 } ] },
    "pages": [ {
        "tag": "PAGE",
        "children": [
            { "tag": "H1", "text": "Title", "font": { "size": 24 }, "margin": { "bottom": 8 } },
            { "tag": "DIV", "children": [
                { "tag": "P", "min_height": 100, "text": "first" },
                { "tag": "P", "min_height": 100, "text": "second" },
                { "tag": "P", "min_height": 100, "text": "third" }
            ] },
            { "tag": "IMG", "src": "https://example.com/a.png", "min_height": 50 }
        ]
    } ]
}"##;

#[test]
fn test_paginate_json_round_trip() {
    let doc = crossdoc::paginate_json(SOURCE, &Paginator::default()).unwrap();
    assert!(doc.pages.len() > 1);
    assert_eq!(doc.images.len(), 1);

    let json = doc.to_json().unwrap();
    let parsed = Document::from_json(&json).unwrap();
    assert_eq!(parsed, doc);
}

#[test]
fn test_layout_json_matches_dsl() {
    let doc = crossdoc::layout_json(SOURCE).unwrap();
    assert_eq!(doc.page_width, 400.0);
    assert_eq!(doc.content_width(), 360.0);
    assert_eq!(doc.content_height(), 300.0 - 40.0 - 20.0);
    let page = &doc.pages[0];
    assert_eq!(page.children[0].rect.height, 24.0);
    assert_eq!(page.children[1].rect.y, 32.0);
    assert_eq!(page.children[1].rect.height, 300.0);
    assert_eq!(page.rect.height, 32.0 + 300.0 + 50.0);
}

#[test]
fn test_bad_json_reports_hint() {
    let err = crossdoc::layout_json("{ \"pages\": [ }").unwrap_err();
    assert!(err.to_string().contains("Hint"));
}
