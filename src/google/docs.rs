use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::{send_json, BatchRequestSink};
use crate::convert::{DocumentEdit, TextRange, TextStyle};
use crate::Result;

const DOCS_API: &str = "https://docs.googleapis.com/v1/documents";

// =============================================================================
// BATCH UPDATE REQUESTS
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateDocumentRequest {
    pub requests: Vec<Request>,
}

/// One entry of a batchUpdate; serializes as `{"insertText": {...}}` and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertTextRequest),
    UpdateParagraphStyle(UpdateParagraphStyleRequest),
    UpdateTextStyle(UpdateTextStyleRequest),
    CreateParagraphBullets(CreateParagraphBulletsRequest),
    InsertTable(InsertTableRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: u32,
    pub end_index: u32,
}

impl From<TextRange> for Range {
    fn from(range: TextRange) -> Self {
        Self {
            start_index: range.start,
            end_index: range.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyleRequest {
    pub range: Range,
    pub paragraph_style: ParagraphStyle,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub named_style_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyleRequest {
    pub range: Range,
    pub text_style: TextStyleFields,
    pub fields: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParagraphBulletsRequest {
    pub range: Range,
    pub bullet_preset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTableRequest {
    pub rows: u32,
    pub columns: u32,
    pub location: Location,
}

impl From<&TextStyle> for TextStyleFields {
    fn from(style: &TextStyle) -> Self {
        match style {
            TextStyle::Bold => Self {
                bold: Some(true),
                ..Default::default()
            },
            TextStyle::Italic => Self {
                italic: Some(true),
                ..Default::default()
            },
            TextStyle::Link(url) => Self {
                link: Some(Link { url: url.clone() }),
                ..Default::default()
            },
        }
    }
}

impl From<&DocumentEdit> for Request {
    fn from(edit: &DocumentEdit) -> Self {
        match edit {
            DocumentEdit::InsertText { at, text } => Request::InsertText(InsertTextRequest {
                location: Location { index: *at },
                text: text.clone(),
            }),
            DocumentEdit::SetParagraphStyle { range, level } => {
                Request::UpdateParagraphStyle(UpdateParagraphStyleRequest {
                    range: (*range).into(),
                    paragraph_style: ParagraphStyle {
                        named_style_type: Some(format!("HEADING_{level}")),
                    },
                    fields: "namedStyleType".to_string(),
                })
            }
            DocumentEdit::ApplyTextStyle { range, style } => {
                Request::UpdateTextStyle(UpdateTextStyleRequest {
                    range: (*range).into(),
                    text_style: style.into(),
                    fields: style.field_mask().to_string(),
                })
            }
            DocumentEdit::CreateBullets { range, preset } => {
                Request::CreateParagraphBullets(CreateParagraphBulletsRequest {
                    range: (*range).into(),
                    bullet_preset: preset.as_api_str().to_string(),
                })
            }
            DocumentEdit::InsertTable { at, rows, columns } => {
                Request::InsertTable(InsertTableRequest {
                    rows: *rows,
                    columns: *columns,
                    location: Location { index: *at },
                })
            }
        }
    }
}

// =============================================================================
// DOCUMENT STRUCTURE
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    pub body: Option<Body>,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

impl Document {
    /// Depth-first search through the tab tree, children included.
    pub fn find_tab(&self, tab_id: &str) -> Option<&Tab> {
        fn search<'a>(tabs: &'a [Tab], tab_id: &str) -> Option<&'a Tab> {
            tabs.iter().find_map(|tab| {
                if tab.id() == Some(tab_id) {
                    Some(tab)
                } else {
                    search(&tab.child_tabs, tab_id)
                }
            })
        }
        search(&self.tabs, tab_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub tab_properties: Option<TabProperties>,
    pub document_tab: Option<DocumentTab>,
    #[serde(default)]
    pub child_tabs: Vec<Tab>,
}

impl Tab {
    pub fn id(&self) -> Option<&str> {
        self.tab_properties.as_ref().map(|p| p.tab_id.as_str())
    }

    pub fn body(&self) -> Option<&Body> {
        self.document_tab.as_ref().and_then(|tab| tab.body.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabProperties {
    pub tab_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTab {
    pub body: Option<Body>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

impl Body {
    /// Text runs of every top-level paragraph, in order.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|element| element.paragraph.as_ref())
            .flat_map(|paragraph| &paragraph.elements)
            .filter_map(|element| element.text_run.as_ref())
            .filter_map(|run| run.content.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralElement {
    pub paragraph: Option<Paragraph>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
    pub paragraph_style: Option<ParagraphStyle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub content: Option<String>,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct DocsClient {
    client: Client,
    access_token: String,
}

impl DocsClient {
    pub fn new(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }

    pub async fn create(&self, title: &str) -> Result<Document> {
        let request = self
            .client
            .post(DOCS_API)
            .bearer_auth(&self.access_token)
            .json(&json!({ "title": title }));

        let document: Document = send_json(request, "unable to create document").await?;
        info!("Created document {} ({})", document.title, document.document_id);
        Ok(document)
    }

    pub async fn get(&self, document_id: &str, include_tabs: bool) -> Result<Document> {
        let request = self
            .client
            .get(format!("{DOCS_API}/{document_id}"))
            .bearer_auth(&self.access_token)
            .query(&[("includeTabsContent", include_tabs)]);

        send_json(request, "unable to retrieve document").await
    }

    pub async fn batch_update(&self, document_id: &str, requests: Vec<Request>) -> Result<()> {
        debug!("Sending {} requests to document {}", requests.len(), document_id);

        let request = self
            .client
            .post(format!("{DOCS_API}/{document_id}:batchUpdate"))
            .bearer_auth(&self.access_token)
            .json(&BatchUpdateDocumentRequest { requests });

        send_json::<serde_json::Value>(request, "could not update document").await?;
        Ok(())
    }
}

#[async_trait]
impl BatchRequestSink for DocsClient {
    type Edit = DocumentEdit;

    async fn submit(&self, target_id: &str, edits: &[DocumentEdit]) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }
        self.batch_update(target_id, edits.iter().map(Request::from).collect())
            .await
    }
}
