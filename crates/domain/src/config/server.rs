use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_8080")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Path the messaging platform posts webhook batches to.
    #[serde(default = "d_callback_path")]
    pub callback_path: String,
    /// Environment variable holding the API bearer token for `/v1/sessions`.
    /// If neither this nor `api_token` is set, the endpoint is open (dev mode).
    #[serde(default = "d_api_token_env")]
    pub api_token_env: String,
    /// Inline API token.  Takes priority over `api_token_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: d_host(),
            callback_path: d_callback_path(),
            api_token_env: d_api_token_env(),
            api_token: None,
        }
    }
}

impl ServerConfig {
    /// Apply the `PORT` override injected by hosting platforms.
    /// Non-numeric values are ignored.
    pub fn apply_port_override(&mut self, port: Option<&str>) {
        if let Some(p) = port.and_then(|v| v.trim().parse::<u16>().ok()) {
            self.port = p;
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8080() -> u16 {
    8080
}
fn d_host() -> String {
    "0.0.0.0".into()
}
fn d_callback_path() -> String {
    "/callback".into()
}
fn d_api_token_env() -> String {
    "LR_API_TOKEN".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
