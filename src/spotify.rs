use crate::credential::Credential;
use crate::r#trait::{MusicClient, MAX_TRACKS_PER_REQUEST};
use crate::session::{CredentialSession, TokenRefresher};
use crate::types::{Cursor, Page, Playlist, TrackId};
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use http_types::{Method, StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const PLAYLIST_PAGE_LIMIT: u32 = 50;

fn transport(context: &str, e: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Transport(format!("{context}: {e}"))
}

fn parse_url(url: &str) -> Result<Url> {
    url.parse::<Url>()
        .map_err(|e| ScrapeError::Transport(format!("Invalid URL {url}: {e}")))
}

// =============================================================================
// Token refresh
// =============================================================================

/// Refresh-token exchange against the Spotify accounts service.
#[derive(Clone)]
pub struct SpotifyTokenRefresher {
    client: Arc<dyn HttpClient>,
    client_id: String,
    client_secret: String,
    token_url: String,
}

impl SpotifyTokenRefresher {
    pub fn new(client: Arc<dyn HttpClient>, client_id: String, client_secret: String) -> Self {
        Self::with_token_url(client, client_id, client_secret, DEFAULT_TOKEN_URL.to_string())
    }

    pub fn with_token_url(
        client: Arc<dyn HttpClient>,
        client_id: String,
        client_secret: String,
        token_url: String,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            token_url,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[async_trait(?Send)]
impl TokenRefresher for SpotifyTokenRefresher {
    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let form_string = [
            ("grant_type", "refresh_token"),
            ("refresh_token", credential.refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ]
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

        let mut request = Request::new(Method::Post, parse_url(&self.token_url)?);
        request.insert_header("Content-Type", "application/x-www-form-urlencoded");
        request.set_body(form_string);

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| transport("token refresh", e))?;
        let status = response.status();
        let body = response
            .body_string()
            .await
            .map_err(|e| transport("token refresh", e))?;

        if !status.is_success() {
            // 400 invalid_grant: the refresh token itself was revoked or expired.
            if let Ok(error) = serde_json::from_str::<TokenErrorResponse>(&body) {
                if status == StatusCode::BadRequest || status == StatusCode::Unauthorized {
                    let description = error.error_description.unwrap_or_default();
                    return Err(ScrapeError::AuthExpired(
                        format!("{} {description}", error.error).trim().to_string(),
                    ));
                }
            }
            return Err(ScrapeError::Transport(format!(
                "token refresh returned HTTP {status}"
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ScrapeError::Parse(format!("token refresh: {e}")))?;

        let mut refreshed = Credential::expiring_in(
            token.access_token,
            token.token_type.unwrap_or_else(|| credential.token_type.clone()),
            token
                .refresh_token
                .unwrap_or_else(|| credential.refresh_token.clone()),
            token.expires_in,
        );
        refreshed.extra = credential.extra.clone();
        Ok(refreshed)
    }
}

// =============================================================================
// Web API client
// =============================================================================

/// [`MusicClient`] backed by the Spotify Web API.
///
/// Every call goes through the [`CredentialSession`], so an expired access token
/// is refreshed before the call and a token the API rejects with 401 is
/// refreshed once and the call re-sent. After a run, check
/// [`session`](Self::session) to see whether the stored token needs rewriting.
pub struct SpotifyClient {
    client: Arc<dyn HttpClient>,
    session: CredentialSession<SpotifyTokenRefresher>,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(
        client: Arc<dyn HttpClient>,
        session: CredentialSession<SpotifyTokenRefresher>,
    ) -> Self {
        Self::with_api_url(client, session, DEFAULT_API_URL.to_string())
    }

    pub fn with_api_url(
        client: Arc<dyn HttpClient>,
        session: CredentialSession<SpotifyTokenRefresher>,
        api_url: String,
    ) -> Self {
        Self {
            client,
            session,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn session(&self) -> &CredentialSession<SpotifyTokenRefresher> {
        &self.session
    }

    async fn send_with_credential(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        credential: &Credential,
    ) -> Result<Response> {
        let mut request = Request::new(method, parse_url(url)?);
        request.insert_header("Authorization", credential.authorization_header());
        if let Some(body) = body {
            request.insert_header("Content-Type", "application/json");
            request.set_body(body);
        }

        log::debug!("Spotify {method} {url}");
        self.client
            .send(request)
            .await
            .map_err(|e| transport(&format!("{method} {url}"), e))
    }

    /// Send an authenticated request and return the response body.
    async fn send_authorized(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
    ) -> Result<String> {
        let credential = self.session.usable_credential().await?;
        let mut response = self
            .send_with_credential(method, url, body, &credential)
            .await?;

        if response.status() == StatusCode::Unauthorized {
            log::debug!("Access token rejected by {url}, refreshing");
            let credential = self.session.refresh().await?;
            response = self
                .send_with_credential(method, url, body, &credential)
                .await?;
        }

        let status = response.status();
        let text = response
            .body_string()
            .await
            .map_err(|e| transport(&format!("{method} {url}"), e))?;
        if !status.is_success() {
            return Err(ScrapeError::Transport(format!(
                "{method} {url} returned HTTP {status}: {}",
                api_error_message(&text)
            )));
        }
        Ok(text)
    }
}

/// Pull `error.message` out of a Web API error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[derive(Deserialize)]
struct PlaylistsPage {
    // Unavailable playlists come back as `null` entries.
    #[serde(default)]
    items: Vec<Option<SpotifyPlaylist>>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize)]
struct SpotifyPlaylist {
    id: String,
    #[serde(default)]
    name: String,
}

#[async_trait(?Send)]
impl MusicClient for SpotifyClient {
    async fn list_playlists(&self, cursor: &Cursor) -> Result<Page<Playlist>> {
        // The cursor is the `next` URL of the previous page.
        let url = if cursor.is_end() {
            format!("{}/me/playlists?limit={PLAYLIST_PAGE_LIMIT}", self.api_url)
        } else {
            cursor.as_str().to_string()
        };

        let body = self.send_authorized(Method::Get, &url, None).await?;
        let page: PlaylistsPage = serde_json::from_str(&body)
            .map_err(|e| ScrapeError::Parse(format!("playlists page: {e}")))?;

        let listed = page.items.len();
        let playlists: Vec<Playlist> = page
            .items
            .into_iter()
            .flatten()
            .map(|p| Playlist::new(p.id, p.name))
            .collect();
        if playlists.len() < listed {
            log::warn!(
                "Skipped {} unavailable playlists on {url}",
                listed - playlists.len()
            );
        }
        Ok(Page::new(playlists, page.next))
    }

    async fn add_tracks(&self, playlist_id: &str, tracks: &[TrackId]) -> Result<()> {
        if tracks.is_empty() {
            return Ok(());
        }
        if tracks.len() > MAX_TRACKS_PER_REQUEST {
            return Err(ScrapeError::Transport(format!(
                "cannot add {} tracks in one request, the limit is {MAX_TRACKS_PER_REQUEST}",
                tracks.len()
            )));
        }

        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_url,
            urlencoding::encode(playlist_id)
        );
        let uris: Vec<String> = tracks.iter().map(TrackId::to_uri).collect();
        let body = serde_json::json!({ "uris": uris }).to_string();

        self.send_authorized(Method::Post, &url, Some(&body)).await?;
        Ok(())
    }
}
