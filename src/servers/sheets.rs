use std::sync::Arc;

use async_mcp::{server::ServerBuilder, transport::Transport};
use serde::Deserialize;
use serde_json::json;

use super::{connect, parse_args, register_tool, tool};
use crate::auth::TokenSource;
use crate::workspace::sheets;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SpreadsheetArgs {
    pub spreadsheet_id: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SheetArgs {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RangeArgs {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub range: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateRangeArgs {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub range: String,
    pub value: String,
}

pub(super) fn register_tools<T: Transport>(
    server: &mut ServerBuilder<T>,
    tokens: &Arc<dyn TokenSource>,
) {
    register_tool(
        server,
        tokens,
        tool(
            "sheets.list",
            "Lists the sheets in a spreadsheet.",
            json!({
                "type": "object",
                "properties": {
                    "spreadsheet-id": {"type": "string"}
                },
                "required": ["spreadsheet-id"]
            }),
        ),
        |tokens, args| async move {
            let args: SpreadsheetArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let names = sheets::list_sheets(&workspace.sheets, &args.spreadsheet_id).await?;
            Ok(names.join("\n"))
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "sheets.get",
            "Gets a whole sheet as CSV.",
            json!({
                "type": "object",
                "properties": {
                    "spreadsheet-id": {"type": "string"},
                    "sheet-name": {"type": "string"}
                },
                "required": ["spreadsheet-id", "sheet-name"]
            }),
        ),
        |tokens, args| async move {
            let args: SheetArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            Ok(sheets::get_sheet_csv(&workspace.sheets, &args.spreadsheet_id, &args.sheet_name).await?)
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "sheets.get-range",
            "Gets a range of a sheet in A1 notation as a JSON array of rows.",
            json!({
                "type": "object",
                "properties": {
                    "spreadsheet-id": {"type": "string"},
                    "sheet-name": {"type": "string"},
                    "range": {"type": "string", "description": "A1 notation, e.g. A1:B2"}
                },
                "required": ["spreadsheet-id", "sheet-name", "range"]
            }),
        ),
        |tokens, args| async move {
            let args: RangeArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            let rows = sheets::get_range(
                &workspace.sheets,
                &args.spreadsheet_id,
                &args.sheet_name,
                Some(&args.range),
            )
            .await?;
            Ok(serde_json::to_string(&rows)?)
        },
    );

    register_tool(
        server,
        tokens,
        tool(
            "sheets.update-range",
            "Writes a value, or a JSON array of rows, to a range of a sheet.",
            json!({
                "type": "object",
                "properties": {
                    "spreadsheet-id": {"type": "string"},
                    "sheet-name": {"type": "string"},
                    "range": {"type": "string"},
                    "value": {"type": "string"}
                },
                "required": ["spreadsheet-id", "sheet-name", "range", "value"]
            }),
        ),
        |tokens, args| async move {
            let args: UpdateRangeArgs = parse_args(args)?;
            let workspace = connect(&tokens).await?;
            sheets::update_range(
                &workspace.sheets,
                &args.spreadsheet_id,
                &args.sheet_name,
                &args.range,
                sheets::parse_update_values(&args.value),
            )
            .await?;
            Ok("Sheet updated successfully.".to_string())
        },
    );
}
