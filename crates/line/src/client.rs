//! HTTP client for the two Messaging API calls the relay makes.

use std::time::Duration;

use lr_domain::config::LineConfig;
use lr_domain::error::{Error, Result};
use lr_domain::event::ReplyToken;

use crate::traits::{ContentFetcher, ReplySink};

/// LINE rejects text messages longer than this many characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Messaging API client authenticated with the channel access token.
pub struct MessagingClient {
    api_base_url: String,
    data_api_base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl MessagingClient {
    pub fn new(cfg: &LineConfig, access_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            api_base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            data_api_base_url: cfg.data_api_base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
        })
    }

    fn reply_url(&self) -> String {
        format!("{}/v2/bot/message/reply", self.api_base_url)
    }

    fn content_url(&self, message_id: &str) -> String {
        format!("{}/v2/bot/message/{}/content", self.data_api_base_url, message_id)
    }
}

/// Build the reply request body: one text message, clipped to the limit.
pub fn reply_body(token: &ReplyToken, text: &str) -> serde_json::Value {
    serde_json::json!({
        "replyToken": token.as_str(),
        "messages": [{"type": "text", "text": truncate_chars(text, MAX_TEXT_CHARS)}],
    })
}

/// Clip `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Map a transport error, dropping the request URL from its text.
fn from_reqwest(e: reqwest::Error) -> Error {
    let e = e.without_url();
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

async fn error_for_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(Error::Line {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl ReplySink for MessagingClient {
    async fn send_reply(&self, token: &ReplyToken, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.reply_url())
            .bearer_auth(&self.access_token)
            .json(&reply_body(token, text))
            .send()
            .await
            .map_err(from_reqwest)?;

        error_for_status(resp).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContentFetcher for MessagingClient {
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(self.content_url(message_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(from_reqwest)?;

        let bytes = error_for_status(resp)
            .await?
            .bytes()
            .await
            .map_err(from_reqwest)?;

        tracing::debug!(message_id, bytes = bytes.len(), "message content fetched");
        Ok(bytes.to_vec())
    }
}
