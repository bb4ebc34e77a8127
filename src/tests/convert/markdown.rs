use crate::convert::markdown::{parse, plain_text, Block, EmphasisLevel, Inline, ListItem, Row};

fn text(value: &str) -> Inline {
    Inline::text(value)
}

fn item(value: &str) -> ListItem {
    ListItem(vec![text(value)])
}

#[test]
fn test_headings_and_paragraphs() {
    let blocks = parse("## Sub *title*\n\nplain text");

    assert_eq!(
        blocks,
        vec![
            Block::Heading {
                level: 2,
                children: vec![
                    text("Sub "),
                    Inline::Emphasis {
                        level: EmphasisLevel::Single,
                        children: vec![text("title")],
                    },
                ],
            },
            Block::Paragraph(vec![text("plain text")]),
        ]
    );
}

#[test]
fn test_link_keeps_destination() {
    let blocks = parse("see [docs](https://example.com/docs)");

    assert_eq!(
        blocks,
        vec![Block::Paragraph(vec![
            text("see "),
            Inline::Link {
                destination: "https://example.com/docs".to_string(),
                children: vec![text("docs")],
            },
        ])]
    );
}

#[test]
fn test_code_strikethrough_and_images_fold_into_text() {
    assert_eq!(
        parse("`x` ~~y~~ ![z](z.png)"),
        vec![Block::Paragraph(vec![text("x y z")])]
    );
}

#[test]
fn test_code_block_becomes_paragraph() {
    assert_eq!(
        parse("```rust\nfn main() {}\n```\n"),
        vec![Block::Paragraph(vec![text("fn main() {}")])]
    );
}

#[test]
fn test_block_quote_contributes_inner_blocks() {
    assert_eq!(
        parse("> quoted"),
        vec![Block::Paragraph(vec![text("quoted")])]
    );
}

#[test]
fn test_rules_and_html_blocks_are_dropped() {
    assert_eq!(
        parse("a\n\n---\n\n<div>\nhidden\n</div>\n\nb"),
        vec![
            Block::Paragraph(vec![text("a")]),
            Block::Paragraph(vec![text("b")]),
        ]
    );
}

#[test]
fn test_nested_lists_are_flattened() {
    assert_eq!(
        parse("- a\n  - b\n- c\n"),
        vec![Block::List {
            ordered: false,
            items: vec![item("a"), item("b"), item("c")],
        }]
    );
}

#[test]
fn test_loose_list_item_paragraphs_join_with_space() {
    assert_eq!(
        parse("1. a\n\n   more\n2. b\n"),
        vec![Block::List {
            ordered: true,
            items: vec![item("a more"), item("b")],
        }]
    );
}

#[test]
fn test_table_inside_list_item_stays_in_item() {
    let blocks = parse("- item one\n\n  | a | b |\n  |---|---|\n  | 1 | 2 |\n- item two\n");

    assert_eq!(
        blocks,
        vec![Block::List {
            ordered: false,
            items: vec![item("item one a b 1 2"), item("item two")],
        }]
    );
}

#[test]
fn test_table_rows_include_header() {
    let blocks = parse("| h1 | h2 |\n|----|----|\n| a | **b** |\n");

    assert_eq!(
        blocks,
        vec![Block::Table {
            rows: vec![
                Row {
                    cells: vec![vec![text("h1")], vec![text("h2")]],
                },
                Row {
                    cells: vec![
                        vec![text("a")],
                        vec![Inline::Emphasis {
                            level: EmphasisLevel::Double,
                            children: vec![text("b")],
                        }],
                    ],
                },
            ],
        }]
    );
}

#[test]
fn test_plain_text_drops_styles() {
    let inlines = vec![
        text("a "),
        Inline::Emphasis {
            level: EmphasisLevel::Double,
            children: vec![Inline::Link {
                destination: "https://x.example".to_string(),
                children: vec![text("b")],
            }],
        },
        text(" c"),
    ];

    assert_eq!(plain_text(&inlines), "a b c");
}
