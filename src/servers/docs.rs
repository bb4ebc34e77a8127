use std::path::PathBuf;
use std::sync::Arc;

use async_mcp::{server::ServerBuilder, transport::Transport};
use serde::Deserialize;
use serde_json::json;

use super::{connect, parse_args, register_tool, tool};
use crate::auth::TokenSource;
use crate::workspace::docs;
use crate::WorkspaceError;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TabsArgs {
    pub document_id: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CreateDocArgs {
    pub title: String,
    #[serde(default)]
    pub markdown_file: Option<PathBuf>,
    #[serde(default)]
    pub markdown_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownSource {
    File(PathBuf),
    Text(String),
}

impl CreateDocArgs {
    /// Exactly one of `markdown_file` and `markdown_text` must be given.
    pub fn source(&self) -> Result<MarkdownSource, WorkspaceError> {
        let file = self.markdown_file.clone().filter(|path| !path.as_os_str().is_empty());
        let text = self.markdown_text.clone().filter(|text| !text.is_empty());
        match (file, text) {
            (Some(file), None) => Ok(MarkdownSource::File(file)),
            (None, Some(text)) => Ok(MarkdownSource::Text(text)),
            (Some(_), Some(_)) => Err(WorkspaceError::validation(
                "only one of markdown_file or markdown_text can be provided",
            )),
            (None, None) => Err(WorkspaceError::validation(
                "either markdown_file or markdown_text must be provided",
            )),
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
            "docs.tabs",
            "Lists the tabs within a Google Doc, nested tabs indented.",
            json!({
                "type": "object",
                "properties": {
                    "document-id": {"type": "string"}
                },
                "required": ["document-id"]
            }),
        ),
        |tokens, args| async move {
            let args: TabsArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let tabs = docs::list_tabs(&workspace.docs, &args.document_id).await?;
            Ok(docs::format_tabs(&tabs))
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "docs.create",
            "Creates a new Google Doc from Markdown, given either a file path or the text itself.",
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "markdown_file": {"type": "string"},
                    "markdown_text": {"type": "string"}
                },
                "required": ["title"]
            }),
        ),
        |tokens, args| async move {
            let args: CreateDocArgs = parse_args(args)?;
            let markdown = match args.source()? {
                MarkdownSource::File(path) => tokio::fs::read_to_string(&path).await?,
                MarkdownSource::Text(text) => text,
            };
            let workspace = connect(&tokens).await?;
            let document = docs::create_from_markdown(&workspace.docs, &args.title, &markdown).await?;
            Ok(format!(
                "Successfully created document {} ({})",
                document.title, document.document_id
            ))
        },
    );
}
