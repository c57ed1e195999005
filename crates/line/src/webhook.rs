//! Webhook wire types.
//!
//! The callback body is decoded in two steps: the envelope keeps each event
//! as raw JSON, and [`WebhookEvent`] gives the typed view of one event.  An
//! event that fails to decode does not poison the rest of the batch.

use serde::Deserialize;

/// `POST /callback` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    /// Bot user ID the events were sent to.
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Events
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    Follow(FollowEvent),
    Postback(PostbackEvent),
    Beacon(BeaconEvent),
    /// unfollow, join, leave, memberJoined, …
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub reply_token: String,
    #[serde(default)]
    pub source: Option<Source>,
    pub message: MessageContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEvent {
    pub reply_token: String,
    #[serde(default)]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackEvent {
    pub reply_token: String,
    #[serde(default)]
    pub source: Option<Source>,
    pub postback: Postback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconEvent {
    pub reply_token: String,
    #[serde(default)]
    pub source: Option<Source>,
    pub beacon: Beacon,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Beacon {
    pub hwid: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message content
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text(TextMessage),
    Image(MediaMessage),
    Video(MediaMessage),
    Sticker(StickerMessage),
    /// audio, file, location, …
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextMessage {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaMessage {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerMessage {
    pub id: String,
    pub package_id: String,
    pub sticker_id: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Present for message stickers.
    #[serde(default)]
    pub text: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Source
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where an event came from.  In groups and rooms `user_id` is only present
/// when the sender consented to sharing it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    User(UserSource),
    Group(GroupSource),
    Room(RoomSource),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSource {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSource {
    pub group_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSource {
    pub room_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Source {
    /// `(user_id, room_id, group_id)` as populated on this source.
    pub fn ids(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        match self {
            Source::User(s) => (Some(s.user_id.as_str()), None, None),
            Source::Group(s) => (s.user_id.as_deref(), None, Some(s.group_id.as_str())),
            Source::Room(s) => (s.user_id.as_deref(), Some(s.room_id.as_str()), None),
        }
    }
}
