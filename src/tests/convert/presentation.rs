use crate::convert::{
    presentation::TITLE_AND_BODY, PlaceholderMapping, PresentationEditBuilder, SlideDeck,
    SlideEdit, SlideSection, TitleSlide,
};

fn insert(object_id: &str, text: &str) -> SlideEdit {
    SlideEdit::InsertText {
        object_id: object_id.to_string(),
        text: text.to_string(),
    }
}

fn create_slide(n: usize) -> SlideEdit {
    SlideEdit::CreateSlide {
        object_id: format!("slide_{n}"),
        layout: TITLE_AND_BODY.to_string(),
        placeholders: vec![
            PlaceholderMapping::new("TITLE", format!("title_{n}")),
            PlaceholderMapping::new("BODY", format!("body_{n}")),
        ],
    }
}

fn title_slide() -> TitleSlide {
    TitleSlide {
        title_id: Some("p_title".to_string()),
        subtitle_id: Some("p_subtitle".to_string()),
    }
}

#[test]
fn test_deck_from_markdown() {
    let deck = SlideDeck::from_markdown("# Deck\n\nSub\n\n## One\n\nBody one\n\n## Two\n");

    assert_eq!(
        deck,
        SlideDeck {
            title: Some("Deck".to_string()),
            subtitle: Some("Sub".to_string()),
            sections: vec![
                SlideSection {
                    title: "One".to_string(),
                    body: Some("Body one".to_string()),
                },
                SlideSection {
                    title: "Two".to_string(),
                    body: None,
                },
            ],
        }
    );
}

#[test]
fn test_second_level_one_heading_opens_a_section() {
    let deck = SlideDeck::from_markdown("# A\n# B\n\ntext\n");

    assert_eq!(deck.title.as_deref(), Some("A"));
    assert_eq!(deck.subtitle, None);
    assert_eq!(
        deck.sections,
        vec![SlideSection {
            title: "B".to_string(),
            body: Some("text".to_string()),
        }]
    );
}

#[test]
fn test_builder_fills_title_slide_then_sections() {
    let deck = SlideDeck::from_markdown("# Deck\n\nSub\n\n## One\n\nBody one\n\n## Two\n");
    let edits = PresentationEditBuilder::new(title_slide()).build(&deck);

    assert_eq!(
        edits,
        vec![
            insert("p_title", "Deck"),
            insert("p_subtitle", "Sub"),
            create_slide(1),
            insert("title_1", "One"),
            insert("body_1", "Body one"),
            create_slide(2),
            insert("title_2", "Two"),
        ]
    );
}

#[test]
fn test_missing_placeholders_skip_title_text() {
    let deck = SlideDeck {
        title: Some("Deck".to_string()),
        subtitle: Some("Sub".to_string()),
        sections: vec![SlideSection {
            title: "Only".to_string(),
            body: None,
        }],
    };
    let edits = PresentationEditBuilder::new(TitleSlide::default()).build(&deck);

    assert_eq!(edits, vec![create_slide(1), insert("title_1", "Only")]);
}

#[test]
fn test_empty_text_is_never_inserted() {
    let deck = SlideDeck {
        title: Some(String::new()),
        subtitle: None,
        sections: vec![SlideSection {
            title: String::new(),
            body: Some(String::new()),
        }],
    };
    let edits = PresentationEditBuilder::new(title_slide()).build(&deck);

    assert_eq!(edits, vec![create_slide(1)]);
}

#[test]
fn test_create_slide_precedes_its_inserts() {
    let deck = SlideDeck::from_markdown("## a\n\nx\n\n## b\n\ny\n\n## c\n");
    let edits = PresentationEditBuilder::new(title_slide()).build(&deck);

    let mut created = Vec::new();
    for edit in &edits {
        match edit {
            SlideEdit::CreateSlide { placeholders, .. } => {
                created.extend(placeholders.iter().map(|p| p.object_id.clone()))
            }
            SlideEdit::InsertText { object_id, .. } => assert!(created.contains(object_id)),
            SlideEdit::CreateImage { .. } => unreachable!(),
        }
    }
    assert_eq!(created.len(), 6);
}

#[test]
fn test_title_slide_from_placeholders() {
    let title_slide = TitleSlide::from_placeholders(&[
        ("i0", "CENTERED_TITLE"),
        ("i1", "SUBTITLE"),
        ("i2", "SLIDE_NUMBER"),
    ]);

    assert_eq!(title_slide.title_id.as_deref(), Some("i0"));
    assert_eq!(title_slide.subtitle_id.as_deref(), Some("i1"));
    assert_eq!(TitleSlide::from_placeholders(&[]), TitleSlide::default());
}
