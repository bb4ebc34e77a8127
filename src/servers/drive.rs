use std::sync::Arc;

use async_mcp::{server::ServerBuilder, transport::Transport};
use serde::Deserialize;
use serde_json::json;

use super::{connect, parse_args, register_tool, tool};
use crate::auth::TokenSource;
use crate::workspace::{drive, is_printable_format};
use crate::WorkspaceError;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ListArgs {
    #[serde(default)]
    pub limit: Option<i32>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GetArgs {
    pub file_id: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub tab_id: Option<String>,
}

impl GetArgs {
    /// Only text comes back over MCP, so binary export formats are refused
    /// before anything is fetched.
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        let format = self.format.as_deref().filter(|f| !f.is_empty());
        if let Some(format) = format {
            drive::validate_format(format)?;
        }
        if !is_printable_format(format) {
            return Err(WorkspaceError::validation(format!(
                "format {} is binary and cannot be returned as text",
                format.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DescribeArgs {
    pub file_id: String,
}

pub(super) fn register_tools<T: Transport>(
    server: &mut ServerBuilder<T>,
    tokens: &Arc<dyn TokenSource>,
) {
    register_tool(
        server,
        tokens,
        tool(
            "list",
            "Lists files and folders in Google Drive, optionally filtered by a Drive query.",
            json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "default": 100},
                    "query": {"type": "string", "description": "Drive query, e.g. name contains 'notes'"}
                }
            }),
        ),
        |tokens, args| async move {
            let args: ListArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let files = drive::list_files(
                &workspace.drive,
                args.limit.filter(|limit| *limit > 0).unwrap_or(100),
                args.query.as_deref().unwrap_or_default(),
            )
            .await?;
            Ok(drive::format_file_list(&files))
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "get",
            "Downloads a file from Google Drive. Google Docs, Sheets and Slides are exported, \
             a document tab can be selected with tab-id.",
            json!({
                "type": "object",
                "properties": {
                    "file-id": {"type": "string"},
                    "format": {"type": "string", "description": "txt, md, html, csv, tsv"},
                    "tab-id": {"type": "string"}
                },
                "required": ["file-id"]
            }),
        ),
        |tokens, args| async move {
            let args: GetArgs = parse_args(args)?;
            args.validate()?;
            let workspace = connect(&tokens).await?;
            let content = drive::get_file(
                &workspace,
                &args.file_id,
                args.format.as_deref().filter(|f| !f.is_empty()),
                args.tab_id.as_deref().filter(|t| !t.is_empty()),
            )
            .await?;
            Ok(String::from_utf8_lossy(&content).into_owned())
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "describe",
            "Shows detailed metadata for a file as JSON.",
            json!({
                "type": "object",
                "properties": {
                    "file-id": {"type": "string"}
                },
                "required": ["file-id"]
            }),
        ),
        |tokens, args| async move {
            let args: DescribeArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let file = drive::describe_file(&workspace.drive, &args.file_id).await?;
            Ok(serde_json::to_string_pretty(&file)?)
        },
    );
}
