//! Markdown and legacy slide-deck conversion into ordered batch edits.
//!
//! Everything in this module is pure: text goes in, an ordered list of
//! edits comes out. Submitting the edits is the job of a
//! [`BatchRequestSink`](crate::google::BatchRequestSink).

pub mod document;
pub mod legacy;
pub mod markdown;
pub mod presentation;

pub use document::{
    BulletPreset, Cursor, DocumentEdit, DocumentEditBuilder, DocumentEdits, TextRange, TextStyle,
};
pub use presentation::{
    ImagePlacement, PlaceholderMapping, PresentationEditBuilder, SlideDeck, SlideEdit,
    SlideSection, TitleSlide,
};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("slide deck has no title line")]
    MissingTitle,

    #[error("section header on line {line} has no title")]
    EmptySectionTitle { line: usize },
}
