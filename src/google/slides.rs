use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::{send_json, BatchRequestSink};
use crate::convert::{ImagePlacement, SlideEdit, TitleSlide};
use crate::{Result, WorkspaceError};

const SLIDES_API: &str = "https://slides.googleapis.com/v1/presentations";

// =============================================================================
// BATCH UPDATE REQUESTS
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdatePresentationRequest {
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    CreateSlide(CreateSlideRequest),
    InsertText(InsertTextRequest),
    CreateImage(CreateImageRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideRequest {
    pub object_id: String,
    pub slide_layout_reference: LayoutReference,
    pub placeholder_id_mappings: Vec<LayoutPlaceholderIdMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    pub predefined_layout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlaceholderIdMapping {
    pub layout_placeholder: PlaceholderRef,
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderRef {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub object_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    pub object_id: String,
    pub url: String,
    pub element_properties: PageElementProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElementProperties {
    pub page_object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    pub transform: AffineTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: String,
}

impl Dimension {
    fn points(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: "PT".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub unit: String,
}

fn element_properties(page_id: &str, placement: &ImagePlacement) -> PageElementProperties {
    PageElementProperties {
        page_object_id: page_id.to_string(),
        size: placement.has_size().then(|| Size {
            width: Dimension::points(placement.width),
            height: Dimension::points(placement.height),
        }),
        transform: AffineTransform {
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: placement.left,
            translate_y: placement.top,
            unit: "PT".to_string(),
        },
    }
}

impl From<&SlideEdit> for Request {
    fn from(edit: &SlideEdit) -> Self {
        match edit {
            SlideEdit::CreateSlide {
                object_id,
                layout,
                placeholders,
            } => Request::CreateSlide(CreateSlideRequest {
                object_id: object_id.clone(),
                slide_layout_reference: LayoutReference {
                    predefined_layout: layout.clone(),
                },
                placeholder_id_mappings: placeholders
                    .iter()
                    .map(|mapping| LayoutPlaceholderIdMapping {
                        layout_placeholder: PlaceholderRef {
                            kind: mapping.kind.clone(),
                        },
                        object_id: mapping.object_id.clone(),
                    })
                    .collect(),
            }),
            SlideEdit::InsertText { object_id, text } => Request::InsertText(InsertTextRequest {
                object_id: object_id.clone(),
                text: text.clone(),
            }),
            SlideEdit::CreateImage {
                object_id,
                page_id,
                url,
                placement,
            } => Request::CreateImage(CreateImageRequest {
                object_id: object_id.clone(),
                url: url.clone(),
                element_properties: element_properties(page_id, placement),
            }),
        }
    }
}

// =============================================================================
// PRESENTATION STRUCTURE
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub presentation_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slides: Vec<Page>,
}

impl Presentation {
    /// Placeholders of the slide a new presentation starts with.
    pub fn title_slide(&self) -> TitleSlide {
        self.slides
            .first()
            .map(|slide| TitleSlide::from_placeholders(&slide.placeholders()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
    pub slide_properties: Option<SlideProperties>,
}

impl Page {
    /// `(object_id, placeholder_type)` of every placeholder shape.
    pub fn placeholders(&self) -> Vec<(&str, &str)> {
        self.page_elements
            .iter()
            .filter_map(|element| {
                let placeholder = element.shape.as_ref()?.placeholder.as_ref()?;
                Some((element.object_id.as_str(), placeholder.kind.as_str()))
            })
            .collect()
    }

    /// Text of every shape on the page, in element order.
    pub fn text(&self) -> String {
        self.page_elements
            .iter()
            .filter_map(|element| element.shape.as_ref())
            .map(Shape::text)
            .collect()
    }

    /// Speaker notes: the BODY placeholder of the attached notes page.
    pub fn speaker_notes(&self) -> Option<String> {
        let notes_page = self.slide_properties.as_ref()?.notes_page.as_deref()?;
        let notes: String = notes_page
            .page_elements
            .iter()
            .filter_map(|element| element.shape.as_ref())
            .filter(|shape| {
                shape
                    .placeholder
                    .as_ref()
                    .is_some_and(|placeholder| placeholder.kind == "BODY")
            })
            .map(Shape::text)
            .collect();
        Some(notes)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideProperties {
    pub notes_page: Option<Box<Page>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    pub shape: Option<Shape>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub placeholder: Option<Placeholder>,
    pub text: Option<TextContent>,
}

impl Shape {
    fn text(&self) -> String {
        self.text
            .iter()
            .flat_map(|text| &text.text_elements)
            .filter_map(|element| element.text_run.as_ref())
            .filter_map(|run| run.content.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Placeholder {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub content_url: String,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct SlidesClient {
    client: Client,
    access_token: String,
}

impl SlidesClient {
    pub fn new(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }

    pub async fn create(&self, title: &str) -> Result<Presentation> {
        let request = self
            .client
            .post(SLIDES_API)
            .bearer_auth(&self.access_token)
            .json(&json!({ "title": title }));

        let presentation: Presentation =
            send_json(request, "unable to create presentation").await?;
        info!(
            "Created presentation {} ({})",
            presentation.title, presentation.presentation_id
        );
        Ok(presentation)
    }

    pub async fn get(&self, presentation_id: &str) -> Result<Presentation> {
        let request = self
            .client
            .get(format!("{SLIDES_API}/{presentation_id}"))
            .bearer_auth(&self.access_token);

        send_json(request, "unable to retrieve presentation").await
    }

    pub async fn thumbnail(&self, presentation_id: &str, page_id: &str) -> Result<Thumbnail> {
        let request = self
            .client
            .get(format!(
                "{SLIDES_API}/{presentation_id}/pages/{page_id}/thumbnail"
            ))
            .bearer_auth(&self.access_token)
            .query(&[("thumbnailProperties.mimeType", "PNG")]);

        send_json(request, &format!("unable to get thumbnail for slide {page_id}")).await
    }

    /// Thumbnail content URLs are pre-signed and fetched without credentials.
    pub async fn download(&self, content_url: &str) -> Result<Vec<u8>> {
        let what = "failed to download thumbnail";
        let response = self
            .client
            .get(content_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| WorkspaceError::remote(what, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WorkspaceError::remote(what, e))?;
        Ok(bytes.to_vec())
    }

    pub async fn batch_update(&self, presentation_id: &str, requests: Vec<Request>) -> Result<()> {
        debug!(
            "Sending {} requests to presentation {}",
            requests.len(),
            presentation_id
        );

        let request = self
            .client
            .post(format!("{SLIDES_API}/{presentation_id}:batchUpdate"))
            .bearer_auth(&self.access_token)
            .json(&BatchUpdatePresentationRequest { requests });

        send_json::<serde_json::Value>(request, "unable to update presentation").await?;
        Ok(())
    }
}

#[async_trait]
impl BatchRequestSink for SlidesClient {
    type Edit = SlideEdit;

    async fn submit(&self, target_id: &str, edits: &[SlideEdit]) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }
        self.batch_update(target_id, edits.iter().map(Request::from).collect())
            .await
    }
}
