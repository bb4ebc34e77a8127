use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::convert::{
    ImagePlacement, PlaceholderMapping, PresentationEditBuilder, SlideDeck, SlideEdit,
};
use crate::google::slides::{Presentation, SlidesClient};
use crate::google::BatchRequestSink;
use crate::{Result, WorkspaceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Markdown,
    Legacy,
}

impl SourceKind {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(SourceKind::Markdown),
            "go-slides" | "slides" | "slide" => Ok(SourceKind::Legacy),
            other => Err(WorkspaceError::validation(format!(
                "unsupported file type: {other}"
            ))),
        }
    }

    pub fn infer(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension {
            "md" | "markdown" => Ok(SourceKind::Markdown),
            "slide" | "slides" => Ok(SourceKind::Legacy),
            _ => Err(WorkspaceError::validation(format!(
                "unable to determine file type from extension: .{extension}"
            ))),
        }
    }

    pub fn parse(self, source: &str) -> Result<SlideDeck> {
        match self {
            SourceKind::Markdown => Ok(SlideDeck::from_markdown(source)),
            SourceKind::Legacy => Ok(SlideDeck::from_legacy(source)?),
        }
    }
}

/// Presentation title when none is given: the file name without extension.
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

pub fn presentation_text(presentation: &Presentation) -> String {
    presentation.slides.iter().map(|slide| slide.text()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesFormat {
    Text,
    Markdown,
}

impl NotesFormat {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "txt" | "text" => Ok(NotesFormat::Text),
            "md" | "markdown" => Ok(NotesFormat::Markdown),
            other => Err(WorkspaceError::validation(format!(
                "invalid notes format: {other}. Valid formats are: txt, md"
            ))),
        }
    }

    fn header(self, slide_number: usize) -> String {
        match self {
            NotesFormat::Text => format!("Slide {slide_number}:\n"),
            NotesFormat::Markdown => format!("## Slide {slide_number}\n\n"),
        }
    }
}

/// Speaker notes of one slide (1-based) or of all slides when `slide_number`
/// is 0. Slides without a notes page are skipped.
pub fn format_notes(
    presentation: &Presentation,
    slide_number: usize,
    format: NotesFormat,
) -> Result<String> {
    let count = presentation.slides.len();
    if slide_number > count {
        return Err(WorkspaceError::validation(format!(
            "invalid slide number: {slide_number}. Presentation has only {count} slides"
        )));
    }

    let selected: Vec<(usize, _)> = presentation
        .slides
        .iter()
        .enumerate()
        .map(|(index, slide)| (index + 1, slide))
        .filter(|(number, _)| slide_number == 0 || *number == slide_number)
        .collect();

    let mut notes = String::new();
    for (number, slide) in selected {
        if let Some(text) = slide.speaker_notes() {
            notes.push_str(&format.header(number));
            notes.push_str(&text);
            notes.push('\n');
        }
    }
    Ok(notes)
}

/// Writes `slide_<n>.<format>` into `output_dir` for every slide.
pub async fn export_thumbnails(
    slides: &SlidesClient,
    presentation_id: &str,
    output_dir: &Path,
    format: &str,
) -> Result<Vec<PathBuf>> {
    if format != "png" {
        warn!("Thumbnails are rendered as PNG; saving with .{format} extension");
    }

    let presentation = slides.get(presentation_id).await?;
    tokio::fs::create_dir_all(output_dir).await?;

    let mut written = Vec::with_capacity(presentation.slides.len());
    for (index, slide) in presentation.slides.iter().enumerate() {
        let thumbnail = slides.thumbnail(presentation_id, &slide.object_id).await?;
        let bytes = slides.download(&thumbnail.content_url).await?;
        let path = output_dir.join(format!("slide_{}.{format}", index + 1));
        tokio::fs::write(&path, bytes).await?;
        written.push(path);
    }
    Ok(written)
}

pub async fn create_presentation(slides: &SlidesClient, title: &str) -> Result<Presentation> {
    slides.create(title).await
}

/// Parses first so malformed input never leaves an empty presentation behind.
pub async fn create_from_source(
    slides: &SlidesClient,
    title: &str,
    source: &str,
    kind: SourceKind,
) -> Result<Presentation> {
    let deck = kind.parse(source)?;
    let presentation = slides.create(title).await?;
    let edits = PresentationEditBuilder::new(presentation.title_slide()).build(&deck);
    slides.submit(&presentation.presentation_id, &edits).await?;
    Ok(presentation)
}

/// A single slide with its title placeholder mapped to `title_<suffix>`.
pub fn new_slide_edits(suffix: &str, layout: &str, title: Option<&str>) -> Vec<SlideEdit> {
    let title_id = format!("title_{suffix}");
    let mut edits = vec![SlideEdit::CreateSlide {
        object_id: format!("slide_{suffix}"),
        layout: layout.to_string(),
        placeholders: vec![PlaceholderMapping::new("TITLE", title_id.as_str())],
    }];
    edits.extend(title.and_then(|title| SlideEdit::insert_text(&title_id, title)));
    edits
}

fn timestamp_suffix() -> String {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros())
        .to_string()
}

/// Returns the new slide's object ID.
pub async fn add_slide(
    slides: &SlidesClient,
    presentation_id: &str,
    layout: &str,
    title: Option<&str>,
) -> Result<String> {
    let suffix = timestamp_suffix();
    slides
        .submit(presentation_id, &new_slide_edits(&suffix, layout, title))
        .await?;
    info!("Added slide slide_{} to {}", suffix, presentation_id);
    Ok(format!("slide_{suffix}"))
}

/// Places a publicly reachable image on `slide_id`, or on the first slide.
pub async fn add_image(
    slides: &SlidesClient,
    presentation_id: &str,
    slide_id: Option<&str>,
    url: &str,
    placement: ImagePlacement,
) -> Result<String> {
    let page_id = match slide_id {
        Some(slide_id) => slide_id.to_string(),
        None => slides
            .get(presentation_id)
            .await?
            .slides
            .first()
            .map(|slide| slide.object_id.clone())
            .ok_or_else(|| WorkspaceError::validation("presentation has no slides"))?,
    };

    let object_id = format!("image_{}", timestamp_suffix());
    let edit = SlideEdit::CreateImage {
        object_id: object_id.clone(),
        page_id,
        url: url.to_string(),
        placement,
    };
    slides.submit(presentation_id, &[edit]).await?;
    Ok(object_id)
}
