use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LINE Messaging API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where to find the channel credentials and which endpoints to call.
/// Secrets are only ever read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Env var holding the channel secret used to verify webhook signatures.
    #[serde(default = "d_secret_env")]
    pub channel_secret_env: String,
    /// Env var holding the long-lived channel access token.
    #[serde(default = "d_token_env")]
    pub channel_access_token_env: String,
    #[serde(default = "d_api_base")]
    pub api_base_url: String,
    /// Host serving message content (images, video).
    #[serde(default = "d_data_api_base")]
    pub data_api_base_url: String,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret_env: d_secret_env(),
            channel_access_token_env: d_token_env(),
            api_base_url: d_api_base(),
            data_api_base_url: d_data_api_base(),
            timeout_ms: 10_000,
        }
    }
}

fn d_secret_env() -> String {
    "ChannelSecret".into()
}
fn d_token_env() -> String {
    "ChannelAccessToken".into()
}
fn d_api_base() -> String {
    "https://api.line.me".into()
}
fn d_data_api_base() -> String {
    "https://api-data.line.me".into()
}
fn d_10000() -> u64 {
    10_000
}
