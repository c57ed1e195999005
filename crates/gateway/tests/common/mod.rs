//! In-process fakes for the dispatcher's collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use lr_domain::config::RelayConfig;
use lr_domain::conversation::{ConversationSession, SessionHandle};
use lr_domain::error::{Error, Result};
use lr_domain::event::ReplyToken;
use lr_domain::identity::IdentityKey;
use lr_gateway::runtime::{Collaborators, Dispatcher};
use lr_line::{ContentFetcher, ReplySink};
use lr_providers::{ConversationService, ImageDescriber};
use lr_sessions::{MemorySessionStore, MessageRecorder, SessionStore};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Fakes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
pub struct FakeConversation {
    pub started: AtomicUsize,
    /// `(session_id, text)` for every send.
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
    pub delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeConversation {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ConversationService for FakeConversation {
    fn start_session(&self) -> SessionHandle {
        self.started.fetch_add(1, Ordering::SeqCst);
        Arc::new(ConversationSession::new())
    }

    async fn send(&self, session: &SessionHandle, text: &str) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.sent
            .lock()
            .push((session.session_id().to_owned(), text.to_owned()));
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(Error::Provider {
                provider: "fake".into(),
                message: "quota exhausted".into(),
            });
        }
        let answer = format!("answer to: {text}");
        session.push_exchange(text, &answer);
        Ok(answer)
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub fail: bool,
    pub seen: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl ImageDescriber for FakeImages {
    async fn describe(&self, image: &[u8]) -> Result<String> {
        self.seen.lock().push(image.to_vec());
        if self.fail {
            return Err(Error::Provider {
                provider: "fake".into(),
                message: "blocked".into(),
            });
        }
        Ok(format!("an image of {} bytes", image.len()))
    }
}

#[derive(Default)]
pub struct FakeLine {
    pub replies: Mutex<Vec<(String, String)>>,
    pub fail_replies: bool,
    pub fail_fetch: bool,
}

impl FakeLine {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().clone()
    }

    pub fn reply_texts(&self) -> Vec<String> {
        self.replies().into_iter().map(|(_, t)| t).collect()
    }
}

#[async_trait]
impl ReplySink for FakeLine {
    async fn send_reply(&self, token: &ReplyToken, text: &str) -> Result<()> {
        self.replies
            .lock()
            .push((token.as_str().to_owned(), text.to_owned()));
        if self.fail_replies {
            return Err(Error::Line {
                status: 400,
                message: "Invalid reply token".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentFetcher for FakeLine {
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>> {
        if self.fail_fetch {
            return Err(Error::Line {
                status: 404,
                message: format!("content {message_id} not found"),
            });
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

#[derive(Default)]
pub struct FakeRecorder {
    pub lines: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl MessageRecorder for FakeRecorder {
    async fn record(&self, identity: &IdentityKey, role: &str, text: &str) -> Result<()> {
        self.lines
            .lock()
            .push((identity.to_string(), role.to_owned(), text.to_owned()));
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const PREAMBLE: &str = "PRIME: ";
pub const GREETING: &str = "fresh start";

pub fn relay_config() -> RelayConfig {
    RelayConfig {
        priming_preamble: PREAMBLE.into(),
        reset_greeting: GREETING.into(),
        ..RelayConfig::default()
    }
}

pub struct Harness {
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: Arc<dyn SessionStore>,
    pub conversation: Arc<FakeConversation>,
    pub images: Arc<FakeImages>,
    pub line: Arc<FakeLine>,
    pub recorder: Arc<FakeRecorder>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeConversation::default(), FakeImages::default(), FakeLine::default())
    }

    pub fn with(conversation: FakeConversation, images: FakeImages, line: FakeLine) -> Self {
        let conversation = Arc::new(conversation);
        let images = Arc::new(images);
        let line = Arc::new(line);
        let recorder = Arc::new(FakeRecorder::default());

        let starter = conversation.clone();
        let sessions: Arc<dyn SessionStore> =
            Arc::new(MemorySessionStore::new(move || starter.start_session()));

        let dispatcher = Arc::new(Dispatcher::new(
            Collaborators {
                sessions: sessions.clone(),
                conversation: conversation.clone(),
                images: images.clone(),
                replies: line.clone(),
                content: line.clone(),
                recorder: Some(recorder.clone()),
            },
            &relay_config(),
        ));

        Self {
            dispatcher,
            sessions,
            conversation,
            images,
            line,
            recorder,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Raw webhook events
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn user_source(user_id: &str) -> Value {
    json!({ "type": "user", "userId": user_id })
}

pub fn text_event(token: &str, user_id: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": token,
        "source": user_source(user_id),
        "message": { "type": "text", "id": format!("m-{token}"), "text": text }
    })
}

pub fn image_event(token: &str, user_id: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": token,
        "source": user_source(user_id),
        "message": { "type": "image", "id": format!("img-{token}") }
    })
}

pub fn sticker_event(token: &str, user_id: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": token,
        "source": user_source(user_id),
        "message": {
            "type": "sticker", "id": "s1", "packageId": "11537", "stickerId": "52002734",
            "keywords": ["cony", "wave"], "text": "Hi!"
        }
    })
}
