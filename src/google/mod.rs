//! REST clients for the Docs and Slides APIs.

pub mod docs;
pub mod slides;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Result, WorkspaceError};

/// Submits an ordered edit sequence as one batchUpdate call.
///
/// The offsets inside the edits assume the whole batch applies, so a
/// rejected batch is reported as is and never replayed piecemeal.
#[async_trait]
pub trait BatchRequestSink {
    type Edit: Sync;

    async fn submit(&self, target_id: &str, edits: &[Self::Edit]) -> Result<()>;
}

pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| WorkspaceError::remote(what, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        debug!("{what} returned {status}: {body}");
        return Err(match status {
            StatusCode::NOT_FOUND => WorkspaceError::NotFound(format!("{what}: {body}")),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                WorkspaceError::Auth(format!("{what} ({status}): {body}"))
            }
            _ => WorkspaceError::RemoteApi(format!("{what} ({status}): {body}")),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| WorkspaceError::remote(what, e))
}
