//! Application bootstrap: builds collaborators and shared state from the
//! configuration.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use lr_domain::config::{Config, ConfigSeverity};
use lr_line::MessagingClient;
use lr_providers::{api_key_from_env, ConversationService, GeminiClient};
use lr_sessions::{FileRecorder, MemorySessionStore, MessageRecorder, SessionStore};

use crate::api::auth::token_hash;
use crate::runtime::{Collaborators, Dispatcher};
use crate::state::AppState;

/// Build the full [`AppState`].  Fails only on configuration errors or when
/// an HTTP client cannot be constructed; missing secrets are warnings.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Error => tracing::error!(%issue, "config error"),
            ConfigSeverity::Warning => tracing::warn!(%issue, "config warning"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("{error_count} configuration error(s); see log above");
    }

    // ── Generative-response service ──────────────────────────────────
    let api_key = api_key_from_env(&config.llm.api_key_env);
    if api_key.is_none() {
        tracing::warn!(
            env_var = %config.llm.api_key_env,
            "Gemini API key not set; every conversation will get the fallback reply"
        );
    }
    let gemini = Arc::new(
        GeminiClient::new(&config.llm, api_key, &config.relay.image_prompt)
            .context("building Gemini client")?,
    );

    // ── Messaging platform ───────────────────────────────────────────
    let access_token = api_key_from_env(&config.line.channel_access_token_env).unwrap_or_else(|| {
        tracing::warn!(
            env_var = %config.line.channel_access_token_env,
            "channel access token not set; replies will be rejected"
        );
        String::new()
    });
    let line = Arc::new(
        MessagingClient::new(&config.line, access_token).context("building LINE client")?,
    );

    let channel_secret = api_key_from_env(&config.line.channel_secret_env).map(Arc::<str>::from);
    if channel_secret.is_none() {
        tracing::warn!(
            env_var = %config.line.channel_secret_env,
            "channel secret not set; webhook signatures will NOT be verified"
        );
    }

    // ── Sessions ─────────────────────────────────────────────────────
    let starter = gemini.clone();
    let sessions: Arc<dyn SessionStore> =
        Arc::new(MemorySessionStore::new(move || starter.start_session()));

    let recorder: Option<Arc<dyn MessageRecorder>> = if config.recorder.enabled {
        tracing::info!(dir = %config.recorder.dir.display(), "conversation recorder enabled");
        Some(Arc::new(FileRecorder::new(&config.recorder.dir)))
    } else {
        None
    };

    let dispatcher = Arc::new(Dispatcher::new(
        Collaborators {
            sessions: sessions.clone(),
            conversation: gemini.clone(),
            images: gemini,
            replies: line.clone(),
            content: line,
            recorder,
        },
        &config.relay,
    ));

    // ── API token ────────────────────────────────────────────────────
    let api_token = config
        .server
        .api_token
        .clone()
        .or_else(|| std::env::var(&config.server.api_token_env).ok());
    let api_token_hash = token_hash(api_token.as_deref());
    if api_token_hash.is_none() {
        tracing::warn!(
            env_var = %config.server.api_token_env,
            "API token not set; /v1/sessions is unauthenticated (dev mode)"
        );
    }

    Ok(AppState {
        config,
        dispatcher,
        sessions,
        channel_secret,
        api_token_hash,
        started_at: Instant::now(),
    })
}

/// Spawn the long-running background tasks.  Call after
/// [`build_app_state`] when running the HTTP server.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Idle identity-lock pruning ───────────────────────────────────
    let locks = state.dispatcher.locks().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            locks.prune_idle();
        }
    });
    tracing::info!("background tasks spawned");
}
