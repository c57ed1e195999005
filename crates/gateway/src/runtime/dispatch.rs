//! Event dispatch.
//!
//! One webhook batch is processed in order.  Each event is classified,
//! turned into at most one reply, and never fails the batch: collaborator
//! errors become fallback replies or log lines.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use lr_domain::config::RelayConfig;
use lr_domain::event::{EventKind, InboundEvent, ReplyToken};
use lr_domain::identity::IdentityKey;
use lr_domain::trace::TraceEvent;
use lr_line::{ContentFetcher, ReplySink};
use lr_providers::{ConversationService, ImageDescriber};
use lr_sessions::{MessageRecorder, SessionStore};

use super::classify::classify;
use super::command::{Command, CommandInterpreter, Interpretation};
use super::compose::ReplyComposer;
use super::identity_lock::IdentityLockMap;

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A reply was attempted; `delivered` is false when the platform
    /// rejected it.
    Replied { text: String, delivered: bool },
    /// Text without the command prefix.
    Ignored,
    /// Log-only event kinds.
    Logged,
    /// Nothing could be done: no identity, no reply token or empty text.
    Skipped { reason: String },
}

impl Outcome {
    fn skipped(reason: &str) -> Self {
        Outcome::Skipped {
            reason: reason.to_owned(),
        }
    }
}

/// External collaborators the dispatcher talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub sessions: Arc<dyn SessionStore>,
    pub conversation: Arc<dyn ConversationService>,
    pub images: Arc<dyn ImageDescriber>,
    pub replies: Arc<dyn ReplySink>,
    pub content: Arc<dyn ContentFetcher>,
    pub recorder: Option<Arc<dyn MessageRecorder>>,
}

pub struct Dispatcher {
    collab: Collaborators,
    interpreter: CommandInterpreter,
    composer: ReplyComposer,
    locks: Arc<IdentityLockMap>,
}

impl Dispatcher {
    pub fn new(collab: Collaborators, relay: &RelayConfig) -> Self {
        Self {
            collab,
            interpreter: CommandInterpreter::from_config(relay),
            composer: ReplyComposer::from_config(relay),
            locks: Arc::new(IdentityLockMap::new()),
        }
    }

    pub fn locks(&self) -> &Arc<IdentityLockMap> {
        &self.locks
    }

    /// Process a batch in arrival order.  Returns one outcome per event.
    pub async fn dispatch(&self, events: &[Value]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for raw in events {
            let event = classify(raw);
            TraceEvent::EventReceived {
                kind: event.kind.label().to_owned(),
                identity: event.identity.to_string(),
            }
            .emit();
            outcomes.push(self.handle(event).await);
        }
        outcomes
    }

    /// Handle one classified event.
    pub async fn handle(&self, event: InboundEvent) -> Outcome {
        let InboundEvent {
            reply_token,
            identity,
            kind,
        } = event;

        match kind {
            EventKind::Text { text } => self.handle_text(&identity, reply_token.as_ref(), &text).await,
            EventKind::Image { message_id } => {
                self.handle_image(&identity, reply_token.as_ref(), &message_id)
                    .await
            }
            EventKind::Sticker(sticker) => {
                let text = self.composer.sticker_summary(&sticker);
                self.reply(&identity, reply_token.as_ref(), text).await
            }
            EventKind::Video { message_id } => {
                tracing::info!(identity = %identity, message_id = %message_id, "video message received");
                Outcome::Logged
            }
            EventKind::Follow => {
                tracing::info!(identity = %identity, "follow event received");
                Outcome::Logged
            }
            EventKind::Postback { data } => {
                tracing::info!(identity = %identity, data = %data, "postback event received");
                Outcome::Logged
            }
            EventKind::Beacon { hwid } => {
                tracing::info!(identity = %identity, hwid = %hwid, "beacon event received");
                Outcome::Logged
            }
            EventKind::Other { description } => {
                tracing::info!(identity = %identity, %description, "unhandled event");
                Outcome::Logged
            }
        }
    }

    async fn handle_text(
        &self,
        identity: &IdentityKey,
        token: Option<&ReplyToken>,
        text: &str,
    ) -> Outcome {
        let interpretation = self.interpreter.interpret(text);
        if interpretation == Interpretation::Ignored {
            tracing::debug!(identity = %identity, "text without command prefix ignored");
            return Outcome::Ignored;
        }

        if identity.is_empty() {
            tracing::warn!("text event without a source identity; skipping session lookup");
            return Outcome::skipped("no identity");
        }

        let _guard = self.locks.acquire(identity).await;

        match interpretation {
            Interpretation::Command(Command::Reset) => {
                let (entry, had_prior) = self.collab.sessions.reset(identity);
                tracing::info!(
                    identity = %identity,
                    session_id = %entry.session_id(),
                    had_prior,
                    "conversation reset"
                );
                let greeting = self.composer.reset_greeting(had_prior);
                self.reply(identity, token, greeting).await
            }
            Interpretation::Content(message) => {
                let (entry, created) = self.collab.sessions.get_or_create(identity);
                self.record(identity, "user", &message);

                let input = self.composer.conversation_input(&message, created);
                let reply = match self.collab.conversation.send(&entry.session, &input).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        tracing::error!(
                            identity = %identity,
                            session_id = %entry.session_id(),
                            error = %e,
                            "conversation call failed"
                        );
                        self.composer.conversation_failure(&e)
                    }
                };
                self.reply(identity, token, reply).await
            }
            Interpretation::Ignored => Outcome::Ignored,
        }
    }

    async fn handle_image(
        &self,
        identity: &IdentityKey,
        token: Option<&ReplyToken>,
        message_id: &str,
    ) -> Outcome {
        let text = match self.collab.content.fetch_content(message_id).await {
            Ok(bytes) => match self.collab.images.describe(&bytes).await {
                Ok(description) => description,
                Err(e) => {
                    tracing::warn!(identity = %identity, message_id, error = %e, "image description failed");
                    self.composer.image_failure(&e)
                }
            },
            Err(e) => {
                tracing::warn!(identity = %identity, message_id, error = %e, "image download failed");
                self.composer.image_failure(&e)
            }
        };
        self.reply(identity, token, text).await
    }

    /// Send `text` as the event's single reply.  Failures are logged and
    /// never abort the batch.
    async fn reply(&self, identity: &IdentityKey, token: Option<&ReplyToken>, text: String) -> Outcome {
        let Some(token) = token else {
            tracing::warn!(identity = %identity, "no reply token; reply dropped");
            return Outcome::skipped("no reply token");
        };
        if text.is_empty() {
            tracing::warn!(identity = %identity, "empty reply text; reply dropped");
            return Outcome::skipped("empty reply");
        }

        let delivered = match self.collab.replies.send_reply(token, &text).await {
            Ok(()) => {
                TraceEvent::ReplySent {
                    identity: identity.to_string(),
                    chars: text.chars().count(),
                }
                .emit();
                true
            }
            Err(e) => {
                tracing::warn!(identity = %identity, error = %e, "reply failed");
                false
            }
        };

        if delivered {
            self.record(identity, "bot", &text);
        }
        Outcome::Replied { text, delivered }
    }

    /// Append to the transcript in the background.  Recorder failures only
    /// log.
    fn record(&self, identity: &IdentityKey, role: &'static str, text: &str) {
        let Some(recorder) = self.collab.recorder.clone() else {
            return;
        };
        if identity.is_empty() {
            return;
        }
        let identity = identity.clone();
        let text = text.to_owned();
        tokio::spawn(async move {
            if let Err(e) = recorder.record(&identity, role, &text).await {
                tracing::warn!(identity = %identity, role, error = %e, "recording message failed");
            }
        });
    }
}
