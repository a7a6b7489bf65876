use crate::r#trait::ChatClient;
use crate::types::{Channel, Cursor, Message, Page};
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://slack.com/api";
const PAGE_LIMIT: &str = "200";

/// [`ChatClient`] backed by the Slack Web API.
///
/// Only read methods are used: `conversations.list` and `conversations.history`.
/// The token needs the `channels:read`, `groups:read`, `channels:history` and
/// `groups:history` scopes.
#[derive(Clone)]
pub struct SlackClient {
    client: Arc<dyn HttpClient>,
    token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(client: Arc<dyn HttpClient>, token: String) -> Self {
        Self::with_base_url(client, token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(client: Arc<dyn HttpClient>, token: String, base_url: String) -> Self {
        Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Call a Web API method and decode its payload.
    ///
    /// Slack reports most failures with HTTP 200 and `"ok": false`; both that
    /// and non-success statuses surface as [`ScrapeError::Transport`].
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T> {
        let query = params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}/{method}?{query}", self.base_url);

        let mut request = Request::new(
            Method::Get,
            url.parse::<Url>()
                .map_err(|e| ScrapeError::Transport(format!("Invalid URL {url}: {e}")))?,
        );
        request.insert_header("Authorization", format!("Bearer {}", self.token));

        log::debug!("Slack {method} {}", params_for_log(params));
        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| ScrapeError::Transport(format!("{method}: {e}")))?;

        let status = response.status();
        let body = response
            .body_string()
            .await
            .map_err(|e| ScrapeError::Transport(format!("{method}: {e}")))?;

        if !status.is_success() {
            return Err(ScrapeError::Transport(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let envelope: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ScrapeError::Parse(format!("{method}: {e}")))?;
        if envelope.get("ok").and_then(|ok| ok.as_bool()) != Some(true) {
            let error = envelope
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown_error");
            return Err(ScrapeError::Transport(format!("{method}: {error}")));
        }

        serde_json::from_value(envelope).map_err(|e| ScrapeError::Parse(format!("{method}: {e}")))
    }
}

fn params_for_log(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Deserialize, Default)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct ConversationsList {
    #[serde(default)]
    channels: Vec<SlackChannel>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Deserialize)]
struct SlackChannel {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct ConversationHistory {
    #[serde(default)]
    messages: Vec<SlackMessage>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Deserialize)]
struct SlackMessage {
    #[serde(default)]
    text: String,
}

#[async_trait(?Send)]
impl ChatClient for SlackClient {
    async fn list_channels(&self, cursor: &Cursor) -> Result<Page<Channel>> {
        let list: ConversationsList = self
            .call(
                "conversations.list",
                &[
                    ("types", "public_channel,private_channel"),
                    ("limit", PAGE_LIMIT),
                    ("cursor", cursor.as_str()),
                ],
            )
            .await?;

        let channels = list
            .channels
            .into_iter()
            .map(|c| Channel::new(c.id, c.name))
            .collect();
        Ok(Page::new(channels, list.response_metadata.next_cursor))
    }

    async fn channel_history(&self, channel_id: &str, cursor: &Cursor) -> Result<Page<Message>> {
        let history: ConversationHistory = self
            .call(
                "conversations.history",
                &[
                    ("channel", channel_id),
                    ("limit", PAGE_LIMIT),
                    ("cursor", cursor.as_str()),
                ],
            )
            .await?;

        let messages = history
            .messages
            .into_iter()
            .map(|m| Message::new(m.text, channel_id))
            .collect();
        Ok(Page::new(messages, history.response_metadata.next_cursor))
    }
}
