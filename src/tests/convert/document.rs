use crate::convert::{
    document::utf16_len, BulletPreset, Cursor, DocumentEdit, DocumentEditBuilder, TextRange,
    TextStyle,
};

fn insert(at: u32, text: &str) -> DocumentEdit {
    DocumentEdit::InsertText {
        at,
        text: text.to_string(),
    }
}

fn range(start: u32, end: u32) -> TextRange {
    TextRange { start, end }
}

fn style(start: u32, end: u32, style: TextStyle) -> DocumentEdit {
    DocumentEdit::ApplyTextStyle {
        range: range(start, end),
        style,
    }
}

#[test]
fn test_heading_then_paragraph_with_bold() {
    let result = DocumentEditBuilder::new().build("# Title\n\nHello **world**");

    assert_eq!(
        result.edits,
        vec![
            insert(1, "Title\n"),
            DocumentEdit::SetParagraphStyle {
                range: range(1, 6),
                level: 1,
            },
            insert(7, "Hello "),
            insert(13, "world"),
            style(13, 18, TextStyle::Bold),
            insert(18, "\n"),
        ]
    );
    assert_eq!(result.cursor, Cursor::at(19));
}

#[test]
fn test_heading_style_covers_text_without_newline() {
    let result = DocumentEditBuilder::new().build("### Größe 😀");

    let text = "Größe 😀";
    assert_eq!(
        result.edits[1],
        DocumentEdit::SetParagraphStyle {
            range: range(1, 1 + utf16_len(text)),
            level: 3,
        }
    );
    assert_eq!(result.cursor, Cursor::at(1 + utf16_len(text) + 1));
}

#[test]
fn test_empty_heading_inserts_newline_only() {
    let result = DocumentEditBuilder::new().build("#\n");

    assert_eq!(result.edits, vec![insert(1, "\n")]);
    assert_eq!(result.cursor, Cursor::at(2));
}

#[test]
fn test_unordered_list() {
    let result = DocumentEditBuilder::new().build("- one\n- two\n");

    assert_eq!(
        result.edits,
        vec![
            insert(1, "one\n"),
            DocumentEdit::CreateBullets {
                range: range(1, 4),
                preset: BulletPreset::Disc,
            },
            insert(5, "two\n"),
            DocumentEdit::CreateBullets {
                range: range(5, 8),
                preset: BulletPreset::Disc,
            },
        ]
    );
    assert_eq!(result.cursor, Cursor::at(9));
}

#[test]
fn test_ordered_list_with_emphasis() {
    let result = DocumentEditBuilder::new().build("1. a\n2. *b*\n");

    assert_eq!(
        result.edits,
        vec![
            insert(1, "a\n"),
            DocumentEdit::CreateBullets {
                range: range(1, 2),
                preset: BulletPreset::Numbered,
            },
            insert(3, "b\n"),
            DocumentEdit::CreateBullets {
                range: range(3, 4),
                preset: BulletPreset::Numbered,
            },
            style(3, 4, TextStyle::Italic),
        ]
    );
}

#[test]
fn test_outer_style_precedes_nested_style() {
    let result = DocumentEditBuilder::new().build("***both***");

    assert_eq!(
        result.edits,
        vec![
            insert(1, "both"),
            style(1, 5, TextStyle::Italic),
            style(1, 5, TextStyle::Bold),
            insert(5, "\n"),
        ]
    );
}

#[test]
fn test_link_with_bold_text() {
    let result = DocumentEditBuilder::new().build("[**bold link**](https://example.com)");

    assert_eq!(
        result.edits,
        vec![
            insert(1, "bold link"),
            style(1, 10, TextStyle::Link("https://example.com".to_string())),
            style(1, 10, TextStyle::Bold),
            insert(10, "\n"),
        ]
    );
}

#[test]
fn test_offsets_count_utf16_units() {
    let result = DocumentEditBuilder::new().build("é😀 **x**");

    assert_eq!(
        result.edits,
        vec![
            insert(1, "é😀 "),
            insert(5, "x"),
            style(5, 6, TextStyle::Bold),
            insert(6, "\n"),
        ]
    );
    assert_eq!(result.cursor, Cursor::at(7));
}

#[test]
fn test_table_inserts_table_then_cell_text() {
    let result = DocumentEditBuilder::new().build("| a | b |\n|---|---|\n| 1 | 2 |\n");

    assert_eq!(
        result.edits,
        vec![
            DocumentEdit::InsertTable {
                at: 1,
                rows: 2,
                columns: 2,
            },
            insert(1, "a\tb\n1\t2\n"),
        ]
    );
    assert_eq!(result.cursor, Cursor::at(9));
}

#[test]
fn test_soft_break_joins_lines_with_space() {
    let result = DocumentEditBuilder::new().build("a\nb");

    assert_eq!(result.edits, vec![insert(1, "a b"), insert(4, "\n")]);
}

#[test]
fn test_empty_input_produces_nothing() {
    let result = DocumentEditBuilder::new().build("");

    assert!(result.is_empty());
    assert_eq!(result.cursor, Cursor::START);
}

#[test]
fn test_starting_offset() {
    let result = DocumentEditBuilder::starting_at(Cursor::at(10)).build("hi");

    assert_eq!(result.edits, vec![insert(10, "hi"), insert(12, "\n")]);
    assert_eq!(result.cursor, Cursor::at(13));
}

#[test]
fn test_build_is_deterministic() {
    let markdown = "# A\n\n- *x*\n- [y](https://y.example)\n\n| h |\n|---|\n| c |\n";
    let builder = DocumentEditBuilder::new();

    assert_eq!(builder.build(markdown), builder.build(markdown));
}

#[test]
fn test_every_insert_lands_on_the_running_cursor() {
    let markdown = "# Heading\n\nSome *mixed* **styles** and [links](https://a.example).\n\n\
                    1. first\n2. second\n\n## Second heading\n\nTrailing text.";
    let result = DocumentEditBuilder::new().build(markdown);

    let mut cursor = Cursor::START;
    for edit in &result.edits {
        if let DocumentEdit::InsertText { at, text } = edit {
            assert_eq!(*at, cursor.index(), "insert of {text:?} out of order");
            cursor = cursor.advanced_by(text);
        }
    }
    assert_eq!(cursor, result.cursor);
}

#[test]
fn test_style_ranges_are_never_empty() {
    let result = DocumentEditBuilder::new().build("a ** ** b *c* [](https://empty.example)");

    for edit in &result.edits {
        if let DocumentEdit::ApplyTextStyle { range, .. } = edit {
            assert!(!range.is_empty());
        }
    }
}
