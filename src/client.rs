use google_drive3::DriveHub;
use google_sheets4::Sheets;

use crate::auth::TokenSource;
use crate::google::{docs::DocsClient, slides::SlidesClient};
use crate::Result;

pub type DriveClient = DriveHub<
    google_drive3::hyper_rustls::HttpsConnector<
        google_drive3::hyper_util::client::legacy::connect::HttpConnector,
    >,
>;

pub type SheetsClient = Sheets<
    google_sheets4::hyper_rustls::HttpsConnector<
        google_sheets4::hyper_util::client::legacy::connect::HttpConnector,
    >,
>;

pub fn get_drive_client(access_token: &str) -> Result<DriveClient> {
    let hub = DriveHub::new(
        google_drive3::hyper_util::client::legacy::Client::builder(
            google_drive3::hyper_util::rt::TokioExecutor::new(),
        )
        .build(
            google_drive3::hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()?
                .https_or_http()
                .enable_http1()
                .build(),
        ),
        access_token.to_string(),
    );
    Ok(hub)
}

pub fn get_sheets_client(access_token: &str) -> Result<SheetsClient> {
    let hub = Sheets::new(
        google_sheets4::hyper_util::client::legacy::Client::builder(
            google_sheets4::hyper_util::rt::TokioExecutor::new(),
        )
        .build(
            google_sheets4::hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()?
                .https_or_http()
                .enable_http1()
                .build(),
        ),
        access_token.to_string(),
    );
    Ok(hub)
}

/// One authenticated client per Workspace API, all sharing the same token.
pub struct Workspace {
    pub drive: DriveClient,
    pub sheets: SheetsClient,
    pub docs: DocsClient,
    pub slides: SlidesClient,
}

impl Workspace {
    pub fn from_access_token(access_token: &str) -> Result<Self> {
        let http = reqwest::Client::new();
        Ok(Self {
            drive: get_drive_client(access_token)?,
            sheets: get_sheets_client(access_token)?,
            docs: DocsClient::new(http.clone(), access_token),
            slides: SlidesClient::new(http, access_token),
        })
    }

    pub async fn connect(tokens: &dyn TokenSource) -> Result<Self> {
        let access_token = tokens.access_token().await?;
        Self::from_access_token(&access_token)
    }
}
