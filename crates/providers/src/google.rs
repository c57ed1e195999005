//! Google Gemini adapter.
//!
//! Implements conversation and image description on top of the Gemini
//! `generateContent` API.  The API is stateless, so every chat request
//! carries the session history followed by the new user turn.
//! Auth is via the `x-goog-api-key` header, so the key never appears in a
//! URL or in transport error text.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine as _;
use serde_json::Value;

use lr_domain::config::LlmConfig;
use lr_domain::conversation::{ChatRole, ChatTurn, ConversationSession, SessionHandle};
use lr_domain::error::{Error, Result};
use lr_domain::trace::TraceEvent;

use crate::traits::{ConversationService, ImageDescriber};
use crate::util::from_reqwest;

const PROVIDER: &str = "google";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Gemini client serving both text conversations and image descriptions.
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    vision_model: String,
    chat_temperature: f32,
    image_temperature: f32,
    image_prompt: String,
    client: reqwest::Client,
}

/// Text and token usage extracted from a `generateContent` response.
#[derive(Debug, Clone, PartialEq)]
struct GeminiReply {
    text: String,
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

impl GeminiClient {
    /// Build a client.  A missing `api_key` is not fatal here: every request
    /// then fails with [`Error::Auth`], which the relay reports to the user.
    pub fn new(cfg: &LlmConfig, api_key: Option<String>, image_prompt: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: cfg.chat_model.clone(),
            vision_model: cfg.vision_model.clone(),
            chat_temperature: cfg.chat_temperature,
            image_temperature: cfg.image_temperature,
            image_prompt: image_prompt.to_owned(),
            client,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, kind: &str, body: &Value) -> Result<GeminiReply> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::Auth("no Gemini API key configured".into())
        })?;
        let url = self.generate_url(model);

        tracing::debug!(url = %url, kind, "gemini request");
        let started = Instant::now();

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Provider {
                provider: PROVIDER.into(),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        let reply = parse_gemini_response(&resp_json)?;

        TraceEvent::LlmRequest {
            model: model.to_owned(),
            kind: kind.to_owned(),
            duration_ms: started.elapsed().as_millis() as u64,
            prompt_tokens: reply.prompt_tokens,
            completion_tokens: reply.completion_tokens,
        }
        .emit();

        Ok(reply)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request bodies
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn turn_to_gemini(turn: &ChatTurn) -> Value {
    let role = match turn.role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    };
    serde_json::json!({
        "role": role,
        "parts": [{"text": turn.text}],
    })
}

fn build_chat_body(history: &[ChatTurn], text: &str, temperature: f32) -> Value {
    let mut contents: Vec<Value> = history.iter().map(turn_to_gemini).collect();
    contents.push(serde_json::json!({
        "role": "user",
        "parts": [{"text": text}],
    }));

    serde_json::json!({
        "contents": contents,
        "generationConfig": {"temperature": temperature},
    })
}

fn build_image_body(image: &[u8], prompt: &str, temperature: f32) -> Value {
    let data = base64::engine::general_purpose::STANDARD.encode(image);
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [
                {"inlineData": {"mimeType": sniff_image_mime(image), "data": data}},
                {"text": prompt},
            ],
        }],
        "generationConfig": {"temperature": temperature},
    })
}

/// Guess the MIME type from magic bytes.  LINE serves photos as JPEG, so
/// that is the fallback.
fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_gemini_response(body: &Value) -> Result<GeminiReply> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: PROVIDER.into(),
            message: "no candidates in response".into(),
        })?;

    let text: String = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let usage = body.get("usageMetadata");
    let token_count = |field: &str| {
        usage
            .and_then(|u| u.get(field))
            .and_then(|v| v.as_u64())
            .map(|n| n as u32)
    };

    Ok(GeminiReply {
        text,
        prompt_tokens: token_count("promptTokenCount"),
        completion_tokens: token_count("candidatesTokenCount"),
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ConversationService for GeminiClient {
    fn start_session(&self) -> SessionHandle {
        Arc::new(ConversationSession::new())
    }

    async fn send(&self, session: &SessionHandle, text: &str) -> Result<String> {
        let body = build_chat_body(&session.history(), text, self.chat_temperature);
        let reply = self.generate(&self.chat_model, "chat", &body).await?;
        session.push_exchange(text, &reply.text);
        Ok(reply.text)
    }
}

#[async_trait::async_trait]
impl ImageDescriber for GeminiClient {
    async fn describe(&self, image: &[u8]) -> Result<String> {
        let body = build_image_body(image, &self.image_prompt, self.image_temperature);
        let reply = self.generate(&self.vision_model, "image", &body).await?;
        Ok(reply.text)
    }
}
