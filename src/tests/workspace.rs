use std::path::Path;

use google_drive3::api::File;
use serde_json::{json, Value};

use super::google::sample_presentation;
use crate::convert::{PlaceholderMapping, SlideEdit};
use crate::google::docs::Document;
use crate::workspace::{
    docs::{format_tabs, tab_tree},
    drive::{self, SPREADSHEET_MIME},
    is_printable_format,
    sheets::{a1_range, parse_update_values, to_csv, to_tsv},
    slides::{default_title, format_notes, new_slide_edits, NotesFormat, SourceKind},
};
use crate::WorkspaceError;

const DOCUMENT_MIME: &str = "application/vnd.google-apps.document";

#[test]
fn test_export_mime_type_is_case_insensitive() {
    assert_eq!(drive::export_mime_type("PDF"), Some("application/pdf"));
    assert_eq!(drive::export_mime_type("md"), Some("text/markdown"));
    assert_eq!(drive::export_mime_type("bmp"), None);
}

#[test]
fn test_invalid_format_lists_valid_ones() {
    let err = drive::validate_format("bmp").unwrap_err();

    assert!(matches!(err, WorkspaceError::Validation(_)));
    assert!(err
        .to_string()
        .starts_with("invalid format: bmp. Valid formats are: pdf, docx, html"));
}

#[test]
fn test_resolve_export_defaults() {
    assert_eq!(drive::resolve_export(SPREADSHEET_MIME, None).unwrap(), "text/csv");
    assert_eq!(drive::resolve_export(SPREADSHEET_MIME, Some("txt")).unwrap(), "text/csv");
    assert_eq!(
        drive::resolve_export(SPREADSHEET_MIME, Some("xlsx")).unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(drive::resolve_export(DOCUMENT_MIME, None).unwrap(), "text/plain");
    assert_eq!(drive::resolve_export(DOCUMENT_MIME, Some("md")).unwrap(), "text/markdown");
    assert!(drive::resolve_export(DOCUMENT_MIME, Some("bogus")).is_err());
}

#[test]
fn test_format_file_list() {
    let files = vec![
        File {
            name: Some("Budget".to_string()),
            id: Some("1a".to_string()),
            ..Default::default()
        },
        File {
            name: Some("Notes".to_string()),
            id: Some("2b".to_string()),
            ..Default::default()
        },
    ];

    assert_eq!(drive::format_file_list(&files), "Budget (1a)\nNotes (2b)\n");
    assert_eq!(drive::format_file_list(&[]), "No files found.");
}

#[test]
fn test_printable_formats() {
    assert!(is_printable_format(None));
    assert!(is_printable_format(Some("csv")));
    assert!(!is_printable_format(Some("pdf")));
    assert!(!is_printable_format(Some("xlsx")));
}

#[test]
fn test_tab_tree_formatting() {
    let document: Document = serde_json::from_value(json!({
        "documentId": "doc1",
        "tabs": [
            {
                "tabProperties": {"tabId": "t.0", "title": "Main"},
                "childTabs": [
                    {
                        "tabProperties": {"tabId": "t.1", "title": "Child"},
                        "childTabs": [{"tabProperties": {"tabId": "t.2", "title": "Grandchild"}}]
                    }
                ]
            },
            {"tabProperties": {"tabId": "t.3", "title": "Appendix"}}
        ]
    }))
    .unwrap();

    let tabs = tab_tree(&document.tabs, 0);
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0].children[0].children[0].level, 2);
    assert_eq!(
        format_tabs(&tabs),
        "Tabs:\nMain (t.0)\n\tChild (t.1)\n\t\tGrandchild (t.2)\nAppendix (t.3)\n"
    );
    assert_eq!(format_tabs(&[]), "Tabs:\nNo tabs found.\n");
}

#[test]
fn test_a1_range_quotes_sheet_names() {
    assert_eq!(a1_range("Sheet1", Some("A1:B2")), "Sheet1!A1:B2");
    assert_eq!(a1_range("Sheet1", None), "Sheet1");
    assert_eq!(a1_range("My Sheet", None), "'My Sheet'");
    assert_eq!(a1_range("O'Brien", Some("A1")), "'O''Brien'!A1");
}

#[test]
fn test_a1_range_keeps_quoted_names_and_full_ranges() {
    assert_eq!(a1_range("'My Sheet'", None), "'My Sheet'");
    assert_eq!(a1_range("'My Sheet'", Some("A1:B2")), "'My Sheet'!A1:B2");
    assert_eq!(a1_range("Sheet1!A1:B2", None), "Sheet1!A1:B2");
    assert_eq!(a1_range("'My Sheet'!C3", Some("A1")), "'My Sheet'!C3");
}

#[test]
fn test_csv_quotes_only_when_needed() {
    let rows = vec![
        vec![json!("a,b"), json!(1), Value::Null],
        vec![json!("say \"hi\""), json!("plain")],
    ];

    assert_eq!(to_csv(&rows), "\"a,b\",1,\n\"say \"\"hi\"\"\",plain\n");
    assert_eq!(to_tsv(&rows), "a,b\t1\t\nsay \"hi\"\tplain\n");
}

#[test]
fn test_update_values() {
    assert_eq!(
        parse_update_values(r#"[[1, "a"], [2]]"#),
        vec![vec![json!(1), json!("a")], vec![json!(2)]]
    );
    assert_eq!(parse_update_values("hello"), vec![vec![json!("hello")]]);
    assert_eq!(parse_update_values("[1, 2]"), vec![vec![json!("[1, 2]")]]);
    assert_eq!(parse_update_values("[]"), vec![vec![json!("[]")]]);
}

#[test]
fn test_source_kind() {
    assert_eq!(SourceKind::infer(Path::new("deck.md")).unwrap(), SourceKind::Markdown);
    assert_eq!(SourceKind::infer(Path::new("deck.markdown")).unwrap(), SourceKind::Markdown);
    assert_eq!(SourceKind::infer(Path::new("talk.slide")).unwrap(), SourceKind::Legacy);
    assert!(SourceKind::infer(Path::new("notes.txt")).is_err());
    assert_eq!(SourceKind::from_name("Markdown").unwrap(), SourceKind::Markdown);
    assert!(SourceKind::from_name("pptx").is_err());
}

#[test]
fn test_source_kind_parse_errors_surface() {
    let err = SourceKind::Legacy.parse("").unwrap_err();
    assert!(matches!(err, WorkspaceError::Parse(_)));
}

#[test]
fn test_default_title_is_file_stem() {
    assert_eq!(default_title(Path::new("/tmp/talk.slide")), "talk");
}

#[test]
fn test_notes_formatting() {
    let presentation = sample_presentation();

    assert_eq!(
        format_notes(&presentation, 0, NotesFormat::Text).unwrap(),
        "Slide 2:\nRemember\n\n"
    );
    assert_eq!(
        format_notes(&presentation, 2, NotesFormat::Markdown).unwrap(),
        "## Slide 2\n\nRemember\n\n"
    );
    assert_eq!(format_notes(&presentation, 1, NotesFormat::Text).unwrap(), "");
    assert_eq!(
        format_notes(&presentation, 3, NotesFormat::Text)
            .unwrap_err()
            .to_string(),
        "invalid slide number: 3. Presentation has only 2 slides"
    );
    assert!(NotesFormat::from_name("pdf").is_err());
}

#[test]
fn test_new_slide_edits() {
    let edits = new_slide_edits("42", "TITLE_ONLY", Some("Intro"));

    assert_eq!(
        edits,
        vec![
            SlideEdit::CreateSlide {
                object_id: "slide_42".to_string(),
                layout: "TITLE_ONLY".to_string(),
                placeholders: vec![PlaceholderMapping::new("TITLE", "title_42")],
            },
            SlideEdit::InsertText {
                object_id: "title_42".to_string(),
                text: "Intro".to_string(),
            },
        ]
    );
    assert_eq!(new_slide_edits("1", "BLANK", None).len(), 1);
    assert_eq!(new_slide_edits("1", "BLANK", Some("")).len(), 1);
}
