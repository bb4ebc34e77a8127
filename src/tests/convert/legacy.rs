use crate::convert::{legacy::parse, ParseError, SlideSection};

const TALK: &str = "// draft, do not share
Concurrency Patterns
Composing independent processes
15:04 12 Jan 2006
Tags: go, concurrency

Jane Doe
jane@example.com

* Why

Concurrency is not
parallelism.

- it is composition

** Details

  func main() {}
.image gopher.png
Last line

* Second
";

#[test]
fn test_title_subtitle_and_sections() {
    let deck = parse(TALK).unwrap();

    assert_eq!(deck.title.as_deref(), Some("Concurrency Patterns"));
    assert_eq!(deck.subtitle.as_deref(), Some("Composing independent processes"));
    assert_eq!(
        deck.sections,
        vec![
            SlideSection {
                title: "Why".to_string(),
                body: Some(
                    "Concurrency is not\nparallelism.\n- it is composition\nDetails\nLast line"
                        .to_string()
                ),
            },
            SlideSection {
                title: "Second".to_string(),
                body: None,
            },
        ]
    );
}

#[test]
fn test_metadata_is_not_a_subtitle() {
    let deck = parse("Title\nTags: a, b\n\n* Only\n").unwrap();

    assert_eq!(deck.subtitle, None);
    assert_eq!(deck.sections.len(), 1);
}

#[test]
fn test_missing_title() {
    assert_eq!(parse(""), Err(ParseError::MissingTitle));
    assert_eq!(parse("// only a comment\n\n"), Err(ParseError::MissingTitle));
}

#[test]
fn test_empty_section_title_reports_line() {
    assert_eq!(
        parse("T\n\n* ok\n*   \n"),
        Err(ParseError::EmptySectionTitle { line: 4 })
    );
}
