use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::auth::{AuthProvider, Interaction, TokenSource};
use crate::{Result, WorkspaceError};

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the OAuth client secret file (default ~/.config/drivectl/client_secret.json)
    #[arg(long, global = true, env = "DRIVE_SECRETS")]
    pub secret_file: Option<PathBuf>,

    /// Where the OAuth token is cached (default ~/.config/drivectl/token.json)
    #[arg(long, global = true, env = "DRIVECTL_TOKEN_CACHE")]
    pub token_cache: Option<PathBuf>,

    /// Use this access token and skip OAuth entirely
    #[arg(long, global = true, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Paste the authorization code instead of catching the browser redirect
    #[arg(long, global = true)]
    pub no_browser_auth: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "DRIVECTL_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub secret_file: PathBuf,
    pub token_cache: PathBuf,
    pub access_token: Option<String>,
    pub interaction: Interaction,
}

pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".config").join("drivectl"))
        .ok_or_else(|| WorkspaceError::validation("could not get user home directory"))
}

impl Settings {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let default_path = |name: &str| config_dir().map(|dir| dir.join(name));

        let secret_file = match &args.secret_file {
            Some(path) => path.clone(),
            None => default_path("client_secret.json")?,
        };
        let token_cache = match &args.token_cache {
            Some(path) => path.clone(),
            None => default_path("token.json")?,
        };
        let interaction = if args.no_browser_auth {
            Interaction::Manual
        } else {
            Interaction::Browser
        };

        Ok(Self {
            secret_file,
            token_cache,
            access_token: args.access_token.clone().filter(|token| !token.is_empty()),
            interaction,
        })
    }

    /// The MCP server owns stdin and stdout, so it can never prompt.
    pub fn non_interactive(mut self) -> Self {
        self.interaction = Interaction::Disabled;
        self
    }

    pub fn auth_provider(&self) -> AuthProvider {
        AuthProvider::new(
            self.secret_file.clone(),
            self.token_cache.clone(),
            self.interaction,
        )
    }

    pub fn token_source(&self) -> Arc<dyn TokenSource> {
        match &self.access_token {
            Some(token) => Arc::new(token.clone()),
            None => Arc::new(self.auth_provider()),
        }
    }
}
