use google_sheets4::api::ValueRange;
use serde_json::Value;
use tracing::info;

use crate::client::SheetsClient;
use crate::{Result, WorkspaceError};

/// `sheet!range` in A1 notation, quoting the sheet name unless it is a
/// plain identifier. A name that is already quoted is kept as given, and one
/// that already carries a range (`Sheet1!A1:B2`) is returned unchanged.
pub fn a1_range(sheet: &str, range: Option<&str>) -> String {
    if sheet.contains('!') {
        return sheet.to_string();
    }
    let plain = !sheet.is_empty() && sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let sheet = if plain || sheet.starts_with('\'') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    };
    match range {
        Some(range) if !range.is_empty() => format!("{sheet}!{range}"),
        _ => sheet,
    }
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn csv_field(value: &Value) -> String {
    let text = cell_text(value);
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

pub fn to_csv(rows: &[Vec<Value>]) -> String {
    rows.iter()
        .map(|row| {
            let fields: Vec<String> = row.iter().map(csv_field).collect();
            format!("{}\n", fields.join(","))
        })
        .collect()
}

pub fn to_tsv(rows: &[Vec<Value>]) -> String {
    rows.iter()
        .map(|row| {
            let fields: Vec<String> = row.iter().map(cell_text).collect();
            format!("{}\n", fields.join("\t"))
        })
        .collect()
}

/// Values for `update-range`: a JSON 2-D array is written as is, anything
/// else is a single cell.
pub fn parse_update_values(value: &str) -> Vec<Vec<Value>> {
    if let Ok(Value::Array(rows)) = serde_json::from_str::<Value>(value) {
        if !rows.is_empty() && rows.iter().all(Value::is_array) {
            return rows
                .into_iter()
                .map(|row| match row {
                    Value::Array(cells) => cells,
                    other => vec![other],
                })
                .collect();
        }
    }
    vec![vec![Value::String(value.to_string())]]
}

pub async fn list_sheets(sheets: &SheetsClient, spreadsheet_id: &str) -> Result<Vec<String>> {
    let (_, spreadsheet) = sheets
        .spreadsheets()
        .get(spreadsheet_id)
        .param("fields", "sheets(properties(title))")
        .doit()
        .await
        .map_err(|e| WorkspaceError::remote("unable to retrieve spreadsheet", e))?;

    Ok(spreadsheet
        .sheets
        .unwrap_or_default()
        .into_iter()
        .filter_map(|sheet| sheet.properties.and_then(|properties| properties.title))
        .collect())
}

pub async fn get_range(
    sheets: &SheetsClient,
    spreadsheet_id: &str,
    sheet: &str,
    range: Option<&str>,
) -> Result<Vec<Vec<Value>>> {
    let (_, values) = sheets
        .spreadsheets()
        .values_get(spreadsheet_id, &a1_range(sheet, range))
        .doit()
        .await
        .map_err(|e| WorkspaceError::remote("unable to retrieve data from sheet", e))?;
    Ok(values.values.unwrap_or_default())
}

pub async fn get_sheet_csv(sheets: &SheetsClient, spreadsheet_id: &str, sheet: &str) -> Result<String> {
    let rows = get_range(sheets, spreadsheet_id, sheet, None).await?;
    if rows.is_empty() {
        return Err(WorkspaceError::NotFound("no data found".to_string()));
    }
    Ok(to_csv(&rows))
}

pub async fn update_range(
    sheets: &SheetsClient,
    spreadsheet_id: &str,
    sheet: &str,
    range: &str,
    values: Vec<Vec<Value>>,
) -> Result<()> {
    let target = a1_range(sheet, Some(range));
    let value_range = ValueRange {
        values: Some(values),
        ..Default::default()
    };

    sheets
        .spreadsheets()
        .values_update(value_range, spreadsheet_id, &target)
        .value_input_option("USER_ENTERED")
        .doit()
        .await
        .map_err(|e| WorkspaceError::remote("unable to update sheet", e))?;

    info!("Updated {} in {}", target, spreadsheet_id);
    Ok(())
}
