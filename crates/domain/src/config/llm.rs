use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generative model (Google Gemini)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Env var holding the Gemini API key.
    #[serde(default = "d_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Model used for multi-turn text conversations.
    #[serde(default = "d_model")]
    pub chat_model: String,
    /// Model used to describe images.
    #[serde(default = "d_model")]
    pub vision_model: String,
    /// Low temperature keeps conversational answers precise.
    #[serde(default = "d_chat_temp")]
    pub chat_temperature: f32,
    #[serde(default = "d_image_temp")]
    pub image_temperature: f32,
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: d_key_env(),
            base_url: d_base_url(),
            chat_model: d_model(),
            vision_model: d_model(),
            chat_temperature: d_chat_temp(),
            image_temperature: d_image_temp(),
            timeout_ms: 120_000,
        }
    }
}

fn d_key_env() -> String {
    "GOOGLE_GEMINI_API_KEY".into()
}
fn d_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_model() -> String {
    "gemini-2.0-flash".into()
}
fn d_chat_temp() -> f32 {
    0.1
}
fn d_image_temp() -> f32 {
    0.8
}
fn d_120000() -> u64 {
    120_000
}
