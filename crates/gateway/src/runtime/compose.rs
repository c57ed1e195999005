//! Reply text composition.

use lr_domain::config::RelayConfig;
use lr_domain::error::Error;
use lr_domain::event::Sticker;

/// Builds every piece of text the relay sends: priming, canned replies and
/// fallbacks.
#[derive(Debug, Clone)]
pub struct ReplyComposer {
    preamble: String,
    greeting: String,
    image_failure: String,
    conversation_failure: String,
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

impl ReplyComposer {
    pub fn from_config(cfg: &RelayConfig) -> Self {
        Self {
            preamble: cfg.priming_preamble.clone(),
            greeting: cfg.reset_greeting.clone(),
            image_failure: cfg.image_failure_reply.clone(),
            conversation_failure: cfg.conversation_failure_reply.clone(),
        }
    }

    /// Prepend the priming preamble when `primed` is set.
    pub fn prime(&self, text: &str, primed: bool) -> String {
        if primed {
            format!("{}{text}", self.preamble)
        } else {
            text.to_owned()
        }
    }

    /// Text forwarded to the conversation service.  A session that was just
    /// created gets the preamble in front of its first message.
    pub fn conversation_input(&self, message: &str, session_created: bool) -> String {
        self.prime(message, session_created)
    }

    /// Reply confirming a reset, primed when the identity had no session
    /// before the reset.
    pub fn reset_greeting(&self, had_prior_session: bool) -> String {
        self.prime(&self.greeting, !had_prior_session)
    }

    pub fn sticker_summary(&self, sticker: &Sticker) -> String {
        let mut out = format!(
            "Got a sticker! ID: {}, package: {}, keywords: {}",
            sticker.sticker_id,
            sticker.package_id,
            sticker.keywords.join(","),
        );
        if let Some(text) = sticker.text.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(", text: ");
            out.push_str(text);
        }
        out
    }

    pub fn image_failure(&self, err: &Error) -> String {
        format!("{}{err}", self.image_failure)
    }

    pub fn conversation_failure(&self, err: &Error) -> String {
        format!("{}{err}", self.conversation_failure)
    }
}
