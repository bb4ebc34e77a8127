use google_drive3::api::File;
use tracing::debug;

use super::read_body;
use crate::client::{DriveClient, Workspace};
use crate::{Result, WorkspaceError};

pub const GOOGLE_APPS_PREFIX: &str = "application/vnd.google-apps";
pub const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

const EXPORT_FORMATS: [(&str, &str); 14] = [
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("html", "text/html"),
    ("zip", "application/zip"),
    ("epub", "application/epub+zip"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("csv", "text/csv"),
    ("tsv", "text/tab-separated-values"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
];

/// MIME type Drive should export to for a `--format` name, case-insensitive.
pub fn export_mime_type(format: &str) -> Option<&'static str> {
    let format = format.to_ascii_lowercase();
    EXPORT_FORMATS
        .iter()
        .find(|(name, _)| *name == format)
        .map(|(_, mime)| *mime)
}

pub fn validate_format(format: &str) -> Result<&'static str> {
    export_mime_type(format).ok_or_else(|| {
        let names: Vec<&str> = EXPORT_FORMATS.iter().map(|(name, _)| *name).collect();
        WorkspaceError::validation(format!(
            "invalid format: {format}. Valid formats are: {}",
            names.join(", ")
        ))
    })
}

/// Export target for a Google-native file. Spreadsheets fall back to CSV
/// (also when plain text is asked for), everything else to plain text.
pub fn resolve_export(file_mime: &str, format: Option<&str>) -> Result<&'static str> {
    let requested = format.map(validate_format).transpose()?;
    if file_mime == SPREADSHEET_MIME && matches!(format, None | Some("txt")) {
        return Ok("text/csv");
    }
    Ok(requested.unwrap_or("text/plain"))
}

pub async fn list_files(drive: &DriveClient, limit: i32, query: &str) -> Result<Vec<File>> {
    let mut call = drive
        .files()
        .list()
        .page_size(limit)
        .param("fields", "nextPageToken, files(id, name)");
    if !query.is_empty() {
        call = call.q(query);
    }

    let (_, list) = call
        .doit()
        .await
        .map_err(|e| WorkspaceError::remote("unable to list files", e))?;
    Ok(list.files.unwrap_or_default())
}

pub fn format_file_list(files: &[File]) -> String {
    if files.is_empty() {
        return "No files found.".to_string();
    }
    files
        .iter()
        .map(|file| {
            format!(
                "{} ({})\n",
                file.name.as_deref().unwrap_or_default(),
                file.id.as_deref().unwrap_or_default()
            )
        })
        .collect()
}

pub async fn describe_file(drive: &DriveClient, file_id: &str) -> Result<File> {
    let (_, file) = drive
        .files()
        .get(file_id)
        .param("fields", "*")
        .doit()
        .await
        .map_err(|e| WorkspaceError::remote("unable to retrieve file", e))?;
    Ok(file)
}

/// Downloads a file, exporting Google-native files to `format`. With a
/// `tab_id` the document tab's body is rendered as plain text instead.
pub async fn get_file(
    workspace: &Workspace,
    file_id: &str,
    format: Option<&str>,
    tab_id: Option<&str>,
) -> Result<Vec<u8>> {
    if let Some(format) = format {
        validate_format(format)?;
    }

    if let Some(tab_id) = tab_id {
        let document = workspace.docs.get(file_id, true).await?;
        let tab = document
            .find_tab(tab_id)
            .ok_or_else(|| WorkspaceError::NotFound(format!("tab with id {tab_id} not found")))?;
        let text = tab.body().map(|body| body.plain_text()).unwrap_or_default();
        return Ok(text.into_bytes());
    }

    let (_, file) = workspace
        .drive
        .files()
        .get(file_id)
        .param("fields", "mimeType, name")
        .doit()
        .await
        .map_err(|e| WorkspaceError::remote("unable to retrieve file metadata", e))?;
    let mime_type = file.mime_type.unwrap_or_default();

    if mime_type.starts_with(GOOGLE_APPS_PREFIX) {
        let export_mime = resolve_export(&mime_type, format)?;
        export_file(&workspace.drive, file_id, export_mime).await
    } else {
        debug!("Downloading {} ({})", file_id, mime_type);
        let (response, _) = workspace
            .drive
            .files()
            .get(file_id)
            .param("alt", "media")
            .doit()
            .await
            .map_err(|e| WorkspaceError::remote("unable to download file", e))?;
        read_body(response, "unable to read file content").await
    }
}

pub async fn export_file(drive: &DriveClient, file_id: &str, mime_type: &str) -> Result<Vec<u8>> {
    debug!("Exporting {} as {}", file_id, mime_type);
    let response = drive
        .files()
        .export(file_id, mime_type)
        .doit()
        .await
        .map_err(|e| WorkspaceError::remote("unable to export Google file", e))?;
    read_body(response, "unable to read exported content").await
}
