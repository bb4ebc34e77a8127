use chrono::{Duration, Utc};

use crate::auth::{
    code_from_redirect, load_token, save_token, wait_for_code, AuthProvider, ClientSecrets,
    GoogleAuthService, Interaction, StoredToken, TokenResponse, TokenSource,
};
use crate::WorkspaceError;

fn token_response(refresh_token: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: "ya29.access".to_string(),
        expires_in: 3600,
        refresh_token: refresh_token.map(str::to_string),
        scope: String::new(),
        token_type: "Bearer".to_string(),
    }
}

#[test]
fn test_refresh_keeps_previous_refresh_token() {
    let now = Utc::now();
    let token = StoredToken::from_response(token_response(None), Some("1//refresh".to_string()), now);

    assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
    assert_eq!(token.expiry, now + Duration::seconds(3600));

    let replaced = StoredToken::from_response(token_response(Some("1//new")), Some("1//old".to_string()), now);
    assert_eq!(replaced.refresh_token.as_deref(), Some("1//new"));
}

#[test]
fn test_token_expires_a_minute_early() {
    let now = Utc::now();
    let token = StoredToken::from_response(token_response(None), None, now);

    assert!(!token.is_expired(now));
    assert!(!token.is_expired(now + Duration::seconds(3539)));
    assert!(token.is_expired(now + Duration::seconds(3541)));
}

#[test]
fn test_token_response_without_scope() {
    let response: TokenResponse = serde_json::from_str(
        r#"{"access_token": "abc", "expires_in": 3599, "token_type": "Bearer"}"#,
    )
    .unwrap();

    assert_eq!(response.access_token, "abc");
    assert_eq!(response.refresh_token, None);
}

#[tokio::test]
async fn test_token_cache_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("token.json");

    assert_eq!(load_token(&path).await.unwrap(), None);

    let token = StoredToken::from_response(token_response(Some("1//refresh")), None, Utc::now());
    save_token(&path, &token).await.unwrap();

    assert_eq!(load_token(&path).await.unwrap(), Some(token));
}

#[test]
fn test_client_secrets_layouts() {
    let installed = ClientSecrets::from_json(
        r#"{"installed": {"client_id": "id.apps", "client_secret": "s3cret", "redirect_uris": ["http://localhost"]}}"#,
    )
    .unwrap();
    assert_eq!(installed.client_id, "id.apps");
    assert_eq!(installed.redirect_uris, vec!["http://localhost".to_string()]);

    let web = ClientSecrets::from_json(r#"{"web": {"client_id": "web.apps", "client_secret": "s"}}"#)
        .unwrap();
    assert_eq!(web.client_id, "web.apps");

    let err = ClientSecrets::from_json(r#"{"other": {}}"#).unwrap_err();
    assert!(matches!(err, WorkspaceError::Auth(_)));
}

#[test]
fn test_authorization_url() {
    let service = GoogleAuthService::new("my id".to_string(), "secret".to_string());
    let url = service.authorization_url("http://127.0.0.1:8085", "xyz");

    assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
    assert!(url.contains("client_id=my%20id"));
    assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8085"));
    assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive%20"));
    assert!(url.contains("access_type=offline"));
    assert!(url.ends_with("state=xyz"));
    assert!(!url.contains("secret"));
}

#[test]
fn test_code_from_redirect() {
    assert_eq!(code_from_redirect("/?code=4%2Fabc&state=xyz", "xyz").unwrap(), "4/abc");

    for target in [
        "/?code=abc&state=other",
        "/?code=abc",
        "/?error=access_denied&state=xyz",
        "/?state=xyz",
    ] {
        let err = code_from_redirect(target, "xyz").unwrap_err();
        assert!(matches!(err, WorkspaceError::Auth(_)), "{target}");
    }
}

#[tokio::test]
async fn test_loopback_ignores_requests_without_code() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let waiting = tokio::spawn(wait_for_code(listener, "xyz".to_string()));

    let favicon = reqwest::get(format!("http://{addr}/favicon.ico")).await?.text().await?;
    assert!(favicon.contains("Waiting"), "{favicon}");
    reqwest::get(format!("http://{addr}/")).await?;
    assert!(!waiting.is_finished());

    let done = reqwest::get(format!("http://{addr}/?code=abc&state=xyz")).await?.text().await?;
    assert!(done.contains("successful"), "{done}");
    assert_eq!(waiting.await??, "abc");
    Ok(())
}

#[tokio::test]
async fn test_loopback_reports_denied_consent() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let waiting = tokio::spawn(wait_for_code(listener, "xyz".to_string()));

    reqwest::get(format!("http://{addr}/?error=access_denied&state=xyz")).await?;
    let err = waiting.await?.unwrap_err();
    assert!(matches!(err, WorkspaceError::Auth(_)));
    Ok(())
}

#[tokio::test]
async fn test_static_token_source() {
    let token = "static-token".to_string();
    assert_eq!(token.access_token().await.unwrap(), "static-token");
}

#[tokio::test]
async fn test_provider_uses_valid_cached_token() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("token.json");
    let token = StoredToken::from_response(token_response(None), None, Utc::now());
    save_token(&cache, &token).await.unwrap();

    // The secret file is only needed once the cached token is unusable.
    let provider = AuthProvider::new(dir.path().join("missing.json"), cache, Interaction::Disabled);
    assert_eq!(provider.access_token().await.unwrap(), "ya29.access");
}

#[tokio::test]
async fn test_provider_without_token_or_secrets_fails() {
    let dir = tempfile::tempdir().unwrap();
    let provider = AuthProvider::new(
        dir.path().join("missing.json"),
        dir.path().join("token.json"),
        Interaction::Disabled,
    );

    let err = provider.access_token().await.unwrap_err();
    assert!(matches!(err, WorkspaceError::Auth(_)));
}

#[tokio::test]
async fn test_non_interactive_provider_never_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = dir.path().join("client_secret.json");
    tokio::fs::write(
        &secrets,
        r#"{"installed": {"client_id": "id", "client_secret": "secret"}}"#,
    )
    .await
    .unwrap();

    let provider = AuthProvider::new(secrets, dir.path().join("token.json"), Interaction::Disabled);
    let err = provider.access_token().await.unwrap_err();
    assert!(err.to_string().contains("drivectl auth"));
}
