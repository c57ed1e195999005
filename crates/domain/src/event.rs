//! Classified inbound events.
//!
//! The classifier turns every raw webhook event into exactly one
//! [`InboundEvent`]; unsupported shapes become [`EventKind::Other`] so the
//! dispatcher matches exhaustively and never fails on input it doesn't know.

use serde::Serialize;

use crate::identity::IdentityKey;

/// Single-use capability for replying to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyToken(String);

impl ReplyToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Sticker metadata carried by a sticker message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sticker {
    pub sticker_id: String,
    pub package_id: String,
    pub keywords: Vec<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Text { text: String },
    Image { message_id: String },
    Sticker(Sticker),
    Video { message_id: String },
    Follow,
    Postback { data: String },
    Beacon { hwid: String },
    /// Anything else, with a short description for the log.
    Other { description: String },
}

impl EventKind {
    /// Short label for logs and trace events.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Text { .. } => "text",
            EventKind::Image { .. } => "image",
            EventKind::Sticker(_) => "sticker",
            EventKind::Video { .. } => "video",
            EventKind::Follow => "follow",
            EventKind::Postback { .. } => "postback",
            EventKind::Beacon { .. } => "beacon",
            EventKind::Other { .. } => "other",
        }
    }
}

/// One classified inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundEvent {
    /// Absent for events the platform doesn't allow replies to.
    pub reply_token: Option<ReplyToken>,
    pub identity: IdentityKey,
    pub kind: EventKind,
}
