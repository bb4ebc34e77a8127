pub mod auth;
pub mod client;
pub mod config;
pub mod convert;
pub mod google;
pub mod logging;
mod servers;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use auth::{AuthProvider, GoogleAuthService, Interaction, TokenSource};
pub use client::Workspace;
pub use convert::{DocumentEditBuilder, ParseError, PresentationEditBuilder, SlideDeck};
pub use servers::{http_port, serve_http, WorkspaceServer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Google API error: {0}")]
    RemoteApi(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkspaceError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkspaceError::Validation(message.into())
    }

    /// Wraps a transport or API failure with what was being attempted.
    pub fn remote(context: &str, error: impl std::fmt::Display) -> Self {
        WorkspaceError::RemoteApi(format!("{context}: {error}"))
    }
}

pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;
