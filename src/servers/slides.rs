use std::path::PathBuf;
use std::sync::Arc;

use async_mcp::{server::ServerBuilder, transport::Transport};
use serde::Deserialize;
use serde_json::json;

use super::{connect, parse_args, register_tool, tool};
use crate::auth::TokenSource;
use crate::convert::{presentation::TITLE_AND_BODY, ImagePlacement};
use crate::workspace::{drive, is_printable_format, slides};
use crate::WorkspaceError;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PresentationArgs {
    pub presentation_id: String,
    #[serde(default)]
    pub format: Option<String>,
}

impl PresentationArgs {
    /// Export MIME type, or `None` when the plain slide text is wanted.
    pub fn export_mime(&self) -> Result<Option<&'static str>, WorkspaceError> {
        let Some(format) = self.format.as_deref().filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        if matches!(format, "png" | "jpg") {
            return Err(WorkspaceError::validation(
                "thumbnail export writes image files and is only available from the command line",
            ));
        }
        let mime = drive::validate_format(format)?;
        if !is_printable_format(Some(format)) {
            return Err(WorkspaceError::validation(format!(
                "format {format} is binary and cannot be returned as text"
            )));
        }
        Ok(Some(mime))
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct NotesArgs {
    pub presentation_id: String,
    #[serde(default)]
    pub slide_number: usize,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CreateArgs {
    pub title: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CreateFromArgs {
    pub file: PathBuf,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl CreateFromArgs {
    pub fn source_kind(&self) -> Result<slides::SourceKind, WorkspaceError> {
        match self.kind.as_deref().filter(|kind| !kind.is_empty()) {
            Some(kind) => slides::SourceKind::from_name(kind),
            None => slides::SourceKind::infer(&self.file),
        }
    }

    pub fn title(&self) -> String {
        self.title
            .clone()
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| slides::default_title(&self.file))
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AddSlideArgs {
    pub presentation_id: String,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_layout() -> String {
    TITLE_AND_BODY.to_string()
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AddImageArgs {
    pub presentation_id: String,
    pub image_url: String,
    #[serde(default)]
    pub slide_id: Option<String>,
    #[serde(default = "default_offset")]
    pub left: f64,
    #[serde(default = "default_offset")]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

fn default_offset() -> f64 {
    50.0
}

impl AddImageArgs {
    pub fn placement(&self) -> ImagePlacement {
        ImagePlacement {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
        }
    }
}

pub(super) fn register_tools<T: Transport>(
    server: &mut ServerBuilder<T>,
    tokens: &Arc<dyn TokenSource>,
) {
    register_tool(
        server,
        tokens,
        tool(
            "slides.get",
            "Gets the text of a presentation, or exports it to a text format.",
            json!({
                "type": "object",
                "properties": {
                    "presentation-id": {"type": "string"},
                    "format": {"type": "string", "description": "txt, html"}
                },
                "required": ["presentation-id"]
            }),
        ),
        |tokens, args| async move {
            let args: PresentationArgs = parse_args(args)?;
            let export = args.export_mime()?;
            let workspace = connect(&tokens).await?;
            match export {
                Some(mime) => {
                    let content = drive::export_file(&workspace.drive, &args.presentation_id, mime).await?;
                    Ok(String::from_utf8_lossy(&content).into_owned())
                }
                None => {
                    let presentation = workspace.slides.get(&args.presentation_id).await?;
                    Ok(slides::presentation_text(&presentation))
                }
            }
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "slides.notes",
            "Gets the speaker notes of one slide, or of every slide when slide-number is 0.",
            json!({
                "type": "object",
                "properties": {
                    "presentation-id": {"type": "string"},
                    "slide-number": {"type": "integer", "default": 0},
                    "format": {"type": "string", "description": "txt or md"}
                },
                "required": ["presentation-id"]
            }),
        ),
        |tokens, args| async move {
            let args: NotesArgs = parse_args(args)?;
            let format = slides::NotesFormat::from_name(args.format.as_deref().unwrap_or("txt"))?;
            let workspace = connect(&tokens).await?;
            let presentation = workspace.slides.get(&args.presentation_id).await?;
            Ok(slides::format_notes(&presentation, args.slide_number, format)?)
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "slides.create",
            "Creates an empty presentation.",
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"}
                },
                "required": ["title"]
            }),
        ),
        |tokens, args| async move {
            let args: CreateArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let presentation = slides::create_presentation(&workspace.slides, &args.title).await?;
            Ok(format!(
                "Successfully created presentation with ID: {}",
                presentation.presentation_id
            ))
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "slides.create-from",
            "Creates a presentation from a Markdown or legacy slide file.",
            json!({
                "type": "object",
                "properties": {
                    "file": {"type": "string"},
                    "type": {"type": "string", "description": "markdown or slides, inferred from the extension when omitted"},
                    "title": {"type": "string"}
                },
                "required": ["file"]
            }),
        ),
        |tokens, args| async move {
            let args: CreateFromArgs = parse_args(args)?;
            let kind = args.source_kind()?;
            let source = tokio::fs::read_to_string(&args.file).await?;
            let workspace = connect(&tokens).await?;
            let presentation =
                slides::create_from_source(&workspace.slides, &args.title(), &source, kind).await?;
            Ok(format!(
                "Successfully created presentation with ID: {}",
                presentation.presentation_id
            ))
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "slides.add",
            "Adds a slide to a presentation.",
            json!({
                "type": "object",
                "properties": {
                    "presentation-id": {"type": "string"},
                    "layout": {"type": "string", "default": TITLE_AND_BODY},
                    "title": {"type": "string"}
                },
                "required": ["presentation-id"]
            }),
        ),
        |tokens, args| async move {
            let args: AddSlideArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let slide_id = slides::add_slide(
                &workspace.slides,
                &args.presentation_id,
                &args.layout,
                args.title.as_deref().filter(|t| !t.is_empty()),
            )
            .await?;
            Ok(format!("Successfully added slide {slide_id}"))
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "slides.add-image",
            "Places an image from a public URL on a slide, the first slide by default.",
            json!({
                "type": "object",
                "properties": {
                    "presentation-id": {"type": "string"},
                    "image-url": {"type": "string"},
                    "slide-id": {"type": "string"},
                    "left": {"type": "number", "default": 50},
                    "top": {"type": "number", "default": 50},
                    "width": {"type": "number", "default": 0},
                    "height": {"type": "number", "default": 0}
                },
                "required": ["presentation-id", "image-url"]
            }),
        ),
        |tokens, args| async move {
            let args: AddImageArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let image_id = slides::add_image(
                &workspace.slides,
                &args.presentation_id,
                args.slide_id.as_deref().filter(|s| !s.is_empty()),
                &args.image_url,
                args.placement(),
            )
            .await?;
            Ok(format!("Successfully added image {image_id}"))
        },
    );
}
