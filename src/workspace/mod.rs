//! The operations behind every CLI subcommand and MCP tool.
//!
//! Each function takes the clients it needs and returns data or text; the
//! CLI and the MCP server only decide where that output goes.

pub mod docs;
pub mod drive;
pub mod sheets;
pub mod slides;

use http_body_util::BodyExt;

use crate::{Result, WorkspaceError};

/// Collects a media or export response body into memory.
pub(crate) async fn read_body(response: google_drive3::common::Response, what: &str) -> Result<Vec<u8>> {
    let collected = response
        .into_body()
        .collect()
        .await
        .map_err(|e| WorkspaceError::remote(what, e))?;
    Ok(collected.to_bytes().to_vec())
}

/// Formats that are text and therefore safe to print to a terminal.
pub fn is_printable_format(format: Option<&str>) -> bool {
    matches!(format, None | Some("txt" | "html" | "md" | "markdown" | "csv" | "tsv"))
}
