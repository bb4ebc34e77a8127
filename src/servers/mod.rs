pub mod docs;
pub mod drive;
pub mod sheets;
pub mod slides;

use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_mcp::{
    server::{Server, ServerBuilder},
    transport::Transport,
    types::{
        CallToolRequest, CallToolResponse, ListRequest, Resource, ResourcesListResponse,
        ServerCapabilities, Tool, ToolResponseContent,
    },
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::auth::TokenSource;
use crate::client::Workspace;
use crate::WorkspaceError;

pub const DRIVE_QUERY_CHEAT_SHEET: &str = r#"- "mimeType='application/vnd.google-apps.folder'"
- "name contains 'meeting notes'"
- "modifiedTime > '2025-01-01T00:00:00Z'"
- "trashed = false"
"#;

pub const A1_NOTATION_CHEAT_SHEET: &str = r#"A1 notation is a way to specify a cell or a range of cells in a spreadsheet. It consists of the column letter(s) followed by the row number.

Examples:
- A1 refers to the cell at the intersection of column A and row 1.
- A1:B2 refers to the range of cells from A1 to B2.
- Sheet1!A1:B2 refers to the range A1:B2 on the sheet named "Sheet1".
"#;

/// `(uri, name, description, text)` of every embedded resource.
const RESOURCES: [(&str, &str, &str, &str); 2] = [
    (
        "embedded:drive-query-cheat-sheet",
        "drive-query-cheat-sheet",
        "A cheat sheet of example Google Drive query examples.",
        DRIVE_QUERY_CHEAT_SHEET,
    ),
    (
        "embedded:a1-notation-cheat-sheet",
        "a1-notation-cheat-sheet",
        "A cheat sheet of example A1 notation for Google Sheets.",
        A1_NOTATION_CHEAT_SHEET,
    ),
];

/// MCP server exposing every CLI subcommand as a tool.
///
/// Clients are connected per call from the token source, so a token that
/// expires while the server runs is refreshed on the next call.
pub struct WorkspaceServer {
    tokens: Arc<dyn TokenSource>,
}

impl WorkspaceServer {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self { tokens }
    }

    pub fn build<T: Transport>(self, transport: T) -> Result<Server<T>> {
        let mut server = Server::builder(transport)
            .capabilities(ServerCapabilities {
                tools: Some(json!({
                    "drivectl": {
                        "description": "Google Drive, Docs, Sheets and Slides operations"
                    }
                })),
                ..Default::default()
            })
            .request_handler("resources/list", |_req: ListRequest| {
                Box::pin(async move { list_resources() })
            })
            .request_handler("resources/read", |req: ReadResourceRequest| {
                Box::pin(async move { read_resource(&req.uri) })
            });

        drive::register_tools(&mut server, &self.tokens);
        docs::register_tools(&mut server, &self.tokens);
        sheets::register_tools(&mut server, &self.tokens);
        slides::register_tools(&mut server, &self.tokens);

        Ok(server.build())
    }
}

/// Port of a `--http` address given as `[host]:port` or a bare port.
pub fn http_port(addr: &str) -> Result<u16> {
    let port = addr.rsplit_once(':').map_or(addr, |(_, port)| port);
    port.parse()
        .map_err(|_| anyhow!("invalid HTTP address {addr:?}, expected [host]:port"))
}

/// Serves MCP over HTTP: SSE on `/sse` with posts to `/message`, and
/// WebSocket on `/ws`. Each session gets its own server.
pub async fn serve_http(tokens: Arc<dyn TokenSource>, port: u16) -> Result<()> {
    info!("serving MCP over HTTP on port {}", port);
    async_mcp::run_http_server(port, None, move |transport, _metadata, session_id| {
        let tokens = tokens.clone();
        async move {
            debug!("new MCP session {}", session_id);
            WorkspaceServer::new(tokens).build(transport)
        }
    })
    .await
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadResourceRequest {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadResourceResponse {
    pub contents: Vec<ResourceContents>,
}

pub fn list_resources() -> Result<ResourcesListResponse> {
    let resources = RESOURCES
        .iter()
        .map(|(uri, name, description, _)| -> Result<Resource> {
            Ok(Resource {
                uri: Url::parse(uri)?,
                name: name.to_string(),
                description: Some(description.to_string()),
                mime_type: Some("text/plain".to_string()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResourcesListResponse {
        resources,
        next_cursor: None,
        meta: None,
    })
}

pub fn read_resource(uri: &str) -> Result<ReadResourceResponse> {
    let (_, _, _, text) = RESOURCES
        .iter()
        .find(|(candidate, ..)| *candidate == uri)
        .ok_or_else(|| anyhow!("resource not found: {uri}"))?;

    Ok(ReadResourceResponse {
        contents: vec![ResourceContents {
            uri: uri.to_string(),
            mime_type: "text/plain".to_string(),
            text: text.to_string(),
        }],
    })
}

/// Deserializes a tool's JSON arguments, reporting a missing or mistyped
/// field as a validation error.
pub fn parse_args<A: DeserializeOwned>(args: Value) -> Result<A, WorkspaceError> {
    serde_json::from_value(args).map_err(|e| WorkspaceError::validation(format!("invalid arguments: {e}")))
}

pub(crate) async fn connect(tokens: &Arc<dyn TokenSource>) -> Result<Workspace> {
    Ok(Workspace::connect(tokens.as_ref()).await?)
}

/// Registers `tool`, running `handler` with the token source and the call's
/// arguments as a JSON object. Failures come back as error content.
pub(crate) fn register_tool<T, F, Fut>(
    server: &mut ServerBuilder<T>,
    tokens: &Arc<dyn TokenSource>,
    tool: Tool,
    handler: F,
) where
    T: Transport,
    F: Fn(Arc<dyn TokenSource>, Value) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let tokens = tokens.clone();
    server.register_tool(tool, move |req: CallToolRequest| {
        let tokens = tokens.clone();
        let handler = handler.clone();
        Box::pin(async move {
            let args = Value::Object(req.arguments.unwrap_or_default().into_iter().collect());
            handle_result(handler(tokens, args).await.map(text_response))
        })
    });
}

pub(crate) fn tool(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
        output_schema: None,
    }
}

fn text_response(text: String) -> CallToolResponse {
    CallToolResponse {
        content: vec![ToolResponseContent::Text { text }],
        is_error: None,
        meta: None,
    }
}

fn handle_result(result: Result<CallToolResponse>) -> Result<CallToolResponse> {
    match result {
        Ok(response) => Ok(response),
        Err(e) => Ok(CallToolResponse {
            content: vec![ToolResponseContent::Text {
                text: format!("Error: {}", e),
            }],
            is_error: Some(true),
            meta: None,
        }),
    }
}
