use crate::token_store::TokenStore;
use crate::{Result, ScrapeError};
use std::path::PathBuf;

pub const SPOTIFY_CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const SLACK_TOKEN_VAR: &str = "SLACK_OAUTH_TOKEN";
pub const TOKEN_PATH_VAR: &str = "SPOTCTL_TOKEN_PATH";

/// Process configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    /// Only needed by commands that read from Slack
    pub slack_token: Option<String>,
    pub token_path: PathBuf,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            non_empty(name)
                .ok_or_else(|| ScrapeError::Config(format!("${name} must be set")))
        };

        let spotify_client_id = required(SPOTIFY_CLIENT_ID_VAR)?;
        let spotify_client_secret = required(SPOTIFY_CLIENT_SECRET_VAR)?;
        let token_path = match non_empty(TOKEN_PATH_VAR) {
            Some(path) => PathBuf::from(path),
            None => TokenStore::default_path()?,
        };

        Ok(Self {
            spotify_client_id,
            spotify_client_secret,
            slack_token: non_empty(SLACK_TOKEN_VAR),
            token_path,
        })
    }

    pub fn slack_token(&self) -> Result<&str> {
        self.slack_token.as_deref().ok_or_else(|| {
            ScrapeError::Config(format!("no Slack OAuth token found in ${SLACK_TOKEN_VAR}"))
        })
    }

    pub fn token_store(&self) -> TokenStore {
        TokenStore::new(self.token_path.clone())
    }
}
