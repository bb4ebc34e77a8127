//! Slide decks and the Slides batch edits that build them.
//!
//! Slides are addressed by object ID rather than by offset, so there is no
//! cursor here: the builder only has to keep IDs unique within a batch and
//! emit each `CreateSlide` before the inserts that target its placeholders.

use super::markdown::{self, plain_text, Block};
use super::{legacy, ParseError};
use tracing::warn;

pub const TITLE_AND_BODY: &str = "TITLE_AND_BODY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSection {
    pub title: String,
    pub body: Option<String>,
}

/// Front-end independent shape of a presentation: an optional title slide
/// followed by one title-and-body slide per section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideDeck {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub sections: Vec<SlideSection>,
}

impl SlideDeck {
    /// The first level-1 heading becomes the title slide, every other
    /// heading opens a section. A paragraph directly after a heading is its
    /// subtitle or body; anything else is ignored.
    pub fn from_markdown(markdown_text: &str) -> Self {
        let mut deck = SlideDeck::default();
        let mut blocks = markdown::parse(markdown_text).into_iter().peekable();

        while let Some(block) = blocks.next() {
            let Block::Heading { level, children } = block else {
                continue;
            };
            let heading = plain_text(&children);
            let following = match blocks.peek() {
                Some(Block::Paragraph(paragraph)) => {
                    let text = plain_text(paragraph);
                    blocks.next();
                    Some(text)
                }
                _ => None,
            };

            if level == 1 && deck.title.is_none() {
                deck.title = Some(heading);
                deck.subtitle = following;
            } else {
                deck.sections.push(SlideSection {
                    title: heading,
                    body: following,
                });
            }
        }

        deck
    }

    pub fn from_legacy(source: &str) -> Result<Self, ParseError> {
        legacy::parse(source)
    }
}

/// Placeholder object IDs discovered on slide 0 of a new presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSlide {
    pub title_id: Option<String>,
    pub subtitle_id: Option<String>,
}

impl TitleSlide {
    /// `placeholders` holds `(object_id, placeholder_type)` for each shape on the slide.
    pub fn from_placeholders(placeholders: &[(&str, &str)]) -> Self {
        Self {
            title_id: find_placeholder(placeholders, "CENTERED_TITLE").map(str::to_string),
            subtitle_id: find_placeholder(placeholders, "SUBTITLE").map(str::to_string),
        }
    }
}

pub fn find_placeholder<'a>(placeholders: &[(&'a str, &str)], kind: &str) -> Option<&'a str> {
    placeholders
        .iter()
        .find(|(_, placeholder_type)| *placeholder_type == kind)
        .map(|(object_id, _)| *object_id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMapping {
    /// Placeholder type on the layout, e.g. `TITLE` or `BODY`.
    pub kind: String,
    pub object_id: String,
}

impl PlaceholderMapping {
    pub fn new(kind: &str, object_id: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            object_id: object_id.into(),
        }
    }
}

/// Position and size in points. A zero width or height leaves the size to the image.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImagePlacement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ImagePlacement {
    pub fn has_size(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlideEdit {
    CreateSlide {
        object_id: String,
        layout: String,
        placeholders: Vec<PlaceholderMapping>,
    },
    InsertText {
        object_id: String,
        text: String,
    },
    CreateImage {
        object_id: String,
        page_id: String,
        url: String,
        placement: ImagePlacement,
    },
}

impl SlideEdit {
    /// `None` for empty text, which the Slides API rejects.
    pub fn insert_text(object_id: &str, text: &str) -> Option<Self> {
        (!text.is_empty()).then(|| SlideEdit::InsertText {
            object_id: object_id.to_string(),
            text: text.to_string(),
        })
    }
}

pub struct PresentationEditBuilder {
    title_slide: TitleSlide,
}

impl PresentationEditBuilder {
    pub fn new(title_slide: TitleSlide) -> Self {
        Self { title_slide }
    }

    pub fn build(&self, deck: &SlideDeck) -> Vec<SlideEdit> {
        let mut edits = Vec::new();

        if let Some(title) = &deck.title {
            self.fill_placeholder(&mut edits, self.title_slide.title_id.as_deref(), "title", title);
        }
        if let Some(subtitle) = &deck.subtitle {
            self.fill_placeholder(
                &mut edits,
                self.title_slide.subtitle_id.as_deref(),
                "subtitle",
                subtitle,
            );
        }

        for (n, section) in (1..).zip(&deck.sections) {
            let title_id = format!("title_{n}");
            let body_id = format!("body_{n}");

            edits.push(SlideEdit::CreateSlide {
                object_id: format!("slide_{n}"),
                layout: TITLE_AND_BODY.to_string(),
                placeholders: vec![
                    PlaceholderMapping::new("TITLE", title_id.as_str()),
                    PlaceholderMapping::new("BODY", body_id.as_str()),
                ],
            });
            edits.extend(SlideEdit::insert_text(&title_id, &section.title));
            if let Some(body) = &section.body {
                edits.extend(SlideEdit::insert_text(&body_id, body));
            }
        }

        edits
    }

    fn fill_placeholder(
        &self,
        edits: &mut Vec<SlideEdit>,
        object_id: Option<&str>,
        what: &str,
        text: &str,
    ) {
        match object_id {
            Some(object_id) => edits.extend(SlideEdit::insert_text(object_id, text)),
            None => warn!("title slide has no {what} placeholder, skipping {what} text"),
        }
    }
}
