use std::sync::Arc;
use std::time::Instant;

use lr_domain::config::Config;
use lr_sessions::SessionStore;

use crate::runtime::Dispatcher;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: Arc<dyn SessionStore>,
    /// `None` disables webhook signature verification (dev mode).
    pub channel_secret: Option<Arc<str>>,
    /// SHA-256 of the API token; `None` leaves protected routes open.
    pub api_token_hash: Option<Vec<u8>>,
    pub started_at: Instant,
}
