use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::Uri, Router};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};
use url::Url;

use crate::{Result, WorkspaceError};

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/presentations",
];

/// Anything that can hand out a bearer token for the Workspace APIs.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A token obtained elsewhere, used as is.
#[async_trait]
impl TokenSource for String {
    async fn access_token(&self) -> Result<String> {
        Ok(self.clone())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub token_type: String,
}

/// What the token cache file holds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

impl StoredToken {
    pub fn from_response(response: TokenResponse, previous_refresh: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            // Refresh responses usually omit the refresh token.
            refresh_token: response.refresh_token.or(previous_refresh),
            expiry: now + Duration::seconds(response.expires_in),
        }
    }

    /// Expired a minute early so a token never runs out mid-request.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry - Duration::seconds(60) <= now
    }
}

pub async fn load_token(path: &Path) -> Result<Option<StoredToken>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn save_token(path: &Path, token: &StoredToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(token)?).await?;
    info!("Saved credentials to {}", path.display());
    Ok(())
}

/// OAuth client credentials as downloaded from the Cloud console.
#[derive(Deserialize, Debug, Clone)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl ClientSecrets {
    /// Accepts both the `installed` and the `web` application layouts.
    pub fn from_json(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct SecretFile {
            installed: Option<ClientSecrets>,
            web: Option<ClientSecrets>,
        }

        let file: SecretFile = serde_json::from_str(content)?;
        file.installed.or(file.web).ok_or_else(|| {
            WorkspaceError::Auth("client secret file has no installed or web section".to_string())
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            WorkspaceError::Auth(format!(
                "unable to read client secret file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }
}

#[derive(Clone)]
pub struct GoogleAuthService {
    pub client: Client,
    pub google_client_id: String,
    pub google_client_secret: String,
}

impl GoogleAuthService {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: Client::new(),
            google_client_id: client_id,
            google_client_secret: client_secret,
        }
    }

    pub fn from_secrets(secrets: &ClientSecrets) -> Self {
        Self::new(secrets.client_id.clone(), secrets.client_secret.clone())
    }

    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTH_URI}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            urlencoding::encode(&self.google_client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
            urlencoding::encode(state),
        )
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let payload = json!({
            "client_id": self.google_client_id,
            "client_secret": self.google_client_secret,
            "refresh_token": refresh_token,
            "grant_type": "refresh_token"
        });

        self.exchange_token(&payload).await
    }

    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let payload = json!({
            "client_id": self.google_client_id,
            "client_secret": self.google_client_secret,
            "code": code,
            "redirect_uri": redirect_uri,
            "grant_type": "authorization_code"
        });

        self.exchange_token(&payload).await
    }

    async fn exchange_token(&self, payload: &serde_json::Value) -> Result<TokenResponse> {
        debug!("Token exchange with grant {}", payload["grant_type"]);

        let response = self
            .client
            .post(TOKEN_URI)
            .json(payload)
            .send()
            .await
            .map_err(|e| WorkspaceError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let error = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WorkspaceError::Auth(error));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| WorkspaceError::Auth(format!("token parse error: {e}")))
    }
}

/// How a missing or unrefreshable token may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Print the consent URL and catch the redirect on a loopback port.
    Browser,
    /// Print the consent URL and read the pasted code from stdin.
    Manual,
    /// Fail instead; stdin and stdout may belong to a protocol.
    Disabled,
}

/// Cached OAuth credentials for the installed-app flow.
pub struct AuthProvider {
    secret_file: PathBuf,
    token_cache: PathBuf,
    interaction: Interaction,
    token: Mutex<Option<StoredToken>>,
}

impl AuthProvider {
    pub fn new(secret_file: PathBuf, token_cache: PathBuf, interaction: Interaction) -> Self {
        Self {
            secret_file,
            token_cache,
            interaction,
            token: Mutex::new(None),
        }
    }

    /// Runs the interactive flow regardless of what is cached.
    pub async fn authorize(&self) -> Result<StoredToken> {
        let service = GoogleAuthService::from_secrets(&ClientSecrets::load(&self.secret_file).await?);
        let token = self.interactive(&service).await?;
        save_token(&self.token_cache, &token).await?;
        *self.token.lock().await = Some(token.clone());
        Ok(token)
    }

    async fn interactive(&self, service: &GoogleAuthService) -> Result<StoredToken> {
        let response = match self.interaction {
            Interaction::Browser => loopback_flow(service).await?,
            Interaction::Manual => manual_flow(service).await?,
            Interaction::Disabled => {
                return Err(WorkspaceError::Auth(format!(
                    "no valid token in {}; run `drivectl auth` first",
                    self.token_cache.display()
                )))
            }
        };
        Ok(StoredToken::from_response(response, None, Utc::now()))
    }
}

#[async_trait]
impl TokenSource for AuthProvider {
    async fn access_token(&self) -> Result<String> {
        let mut current = self.token.lock().await;
        if current.is_none() {
            *current = load_token(&self.token_cache).await?;
        }

        let now = Utc::now();
        if let Some(token) = current.as_ref().filter(|token| !token.is_expired(now)) {
            return Ok(token.access_token.clone());
        }

        let service = GoogleAuthService::from_secrets(&ClientSecrets::load(&self.secret_file).await?);
        let refresh = current.as_ref().and_then(|token| token.refresh_token.clone());

        let refreshed = match refresh {
            Some(refresh) => match service.refresh_token(&refresh).await {
                Ok(response) => Some(StoredToken::from_response(response, Some(refresh), now)),
                Err(e) => {
                    warn!("Token refresh failed: {e}");
                    None
                }
            },
            None => None,
        };

        let token = match refreshed {
            Some(token) => token,
            None => self.interactive(&service).await?,
        };

        save_token(&self.token_cache, &token).await?;
        let access_token = token.access_token.clone();
        *current = Some(token);
        Ok(access_token)
    }
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Pulls `code` out of a redirect target such as `/?code=...&state=...`,
/// rejecting a mismatched `state`.
pub fn code_from_redirect(target: &str, expected_state: &str) -> Result<String> {
    let url = Url::parse("http://127.0.0.1")
        .and_then(|base| base.join(target))
        .map_err(|e| WorkspaceError::Auth(format!("malformed redirect: {e}")))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(WorkspaceError::Auth(format!("authorization denied: {value}"))),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(WorkspaceError::Auth("state mismatch in redirect".to_string()));
    }
    code.ok_or_else(|| WorkspaceError::Auth("no authorization code received".to_string()))
}

async fn loopback_flow(service: &GoogleAuthService) -> Result<TokenResponse> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
    let state = random_state();

    eprintln!(
        "Open the following link in your browser to authorize drivectl:\n{}",
        service.authorization_url(&redirect_uri, &state)
    );

    let code = wait_for_code(listener, state).await?;
    service.exchange_code(&code, &redirect_uri).await
}

#[derive(Clone)]
struct RedirectState {
    expected_state: Arc<String>,
    sender: Arc<Mutex<Option<oneshot::Sender<Result<String>>>>>,
}

/// Serves the loopback redirect on `listener` until a request carrying
/// `code` or `error` arrives, then returns the validated code. Other requests
/// (favicon, preconnects) get a waiting page and are otherwise ignored.
pub async fn wait_for_code(listener: TcpListener, expected_state: String) -> Result<String> {
    let (sender, receiver) = oneshot::channel();
    let app = Router::new().fallback(redirect_callback).with_state(RedirectState {
        expected_state: Arc::new(expected_state),
        sender: Arc::new(Mutex::new(Some(sender))),
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
            warn!("loopback redirect server failed: {}", e);
        }
    });

    let result = receiver
        .await
        .map_err(|_| WorkspaceError::Auth("redirect listener closed".to_string()))?;
    let _ = shutdown_tx.send(());
    result
}

async fn redirect_callback(State(redirect): State<RedirectState>, uri: Uri) -> &'static str {
    let carries_result = uri.query().is_some_and(|query| {
        url::form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == "code" || key == "error")
    });
    if !carries_result {
        debug!("ignoring {} while waiting for the authorization redirect", uri.path());
        return "Waiting for the authorization redirect.";
    }

    let target = uri.path_and_query().map_or("/", |target| target.as_str());
    let result = code_from_redirect(target, &redirect.expected_state);
    let body = match &result {
        Ok(_) => "Authentication successful! You can close this browser window.",
        Err(_) => "Invalid request. No authorization code received.",
    };
    if let Some(sender) = redirect.sender.lock().await.take() {
        let _ = sender.send(result);
    }
    body
}

async fn manual_flow(service: &GoogleAuthService) -> Result<TokenResponse> {
    let redirect_uri = "http://127.0.0.1";
    let state = random_state();

    eprintln!(
        "Go to the following link in your browser, then paste the authorization code \
         (or the whole address you were redirected to):\n{}",
        service.authorization_url(redirect_uri, &state)
    );

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let pasted = line.trim();

    let code = if pasted.contains("code=") {
        let target = pasted
            .find('?')
            .map_or(pasted, |start| &pasted[start..]);
        code_from_redirect(target, &state)?
    } else {
        pasted.to_string()
    };
    if code.is_empty() {
        return Err(WorkspaceError::Auth("unable to read authorization code".to_string()));
    }

    service.exchange_code(&code, redirect_uri).await
}
