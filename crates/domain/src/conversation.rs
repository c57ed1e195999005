//! The opaque multi-turn conversation handle.
//!
//! Conversation backends are stateless REST APIs, so the handle carries the
//! turns exchanged so far.  Everything outside the backend adapter treats it
//! as a black box identified by `session_id`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// A live conversation with the generative-response service.
#[derive(Debug)]
pub struct ConversationSession {
    session_id: String,
    created_at: DateTime<Utc>,
    history: Mutex<Vec<ChatTurn>>,
}

/// Shared handle to a session.  The store owns one per identity; callers
/// clone it to send outside the store lock.
pub type SessionHandle = Arc<ConversationSession>;

impl ConversationSession {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Copy of the turns exchanged so far.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.history.lock().clone()
    }

    /// Number of completed exchanges (user + model pairs).
    pub fn exchanges(&self) -> usize {
        self.history.lock().len() / 2
    }

    /// Record a completed exchange.  Only called after the backend replied,
    /// so a failed send leaves the history untouched.
    pub fn push_exchange(&self, user_text: &str, model_text: &str) {
        let mut history = self.history.lock();
        history.push(ChatTurn {
            role: ChatRole::User,
            text: user_text.to_owned(),
        });
        history.push(ChatTurn {
            role: ChatRole::Model,
            text: model_text.to_owned(),
        });
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
