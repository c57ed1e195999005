//! Event classification.
//!
//! Maps one raw webhook event to exactly one [`InboundEvent`].  The mapping
//! is pure and total: anything that doesn't decode, or that the relay has
//! no handling for, becomes [`EventKind::Other`].

use serde_json::Value;

use lr_domain::event::{EventKind, InboundEvent, ReplyToken, Sticker};
use lr_domain::identity::IdentityKey;
use lr_line::webhook::{MessageContent, Source, WebhookEvent};

pub fn classify(raw: &Value) -> InboundEvent {
    match serde_json::from_value::<WebhookEvent>(raw.clone()) {
        Ok(event) => from_webhook(event, raw),
        Err(e) => InboundEvent {
            reply_token: None,
            identity: identity_of_raw(raw),
            kind: EventKind::Other {
                description: format!("undecodable {} event: {e}", type_of(raw)),
            },
        },
    }
}

fn from_webhook(event: WebhookEvent, raw: &Value) -> InboundEvent {
    match event {
        WebhookEvent::Message(m) => {
            let kind = match m.message {
                MessageContent::Text(t) => EventKind::Text { text: t.text },
                MessageContent::Image(i) => EventKind::Image { message_id: i.id },
                MessageContent::Video(v) => EventKind::Video { message_id: v.id },
                MessageContent::Sticker(s) => EventKind::Sticker(Sticker {
                    sticker_id: s.sticker_id,
                    package_id: s.package_id,
                    keywords: s.keywords,
                    text: s.text,
                }),
                MessageContent::Unsupported => EventKind::Other {
                    description: format!(
                        "unsupported message type: {}",
                        raw.get("message").map(type_of).unwrap_or("unknown")
                    ),
                },
            };
            build(Some(m.reply_token), m.source.as_ref(), kind)
        }
        WebhookEvent::Follow(f) => build(Some(f.reply_token), f.source.as_ref(), EventKind::Follow),
        WebhookEvent::Postback(p) => build(
            Some(p.reply_token),
            p.source.as_ref(),
            EventKind::Postback { data: p.postback.data },
        ),
        WebhookEvent::Beacon(b) => build(
            Some(b.reply_token),
            b.source.as_ref(),
            EventKind::Beacon { hwid: b.beacon.hwid },
        ),
        WebhookEvent::Unknown => InboundEvent {
            reply_token: None,
            identity: identity_of_raw(raw),
            kind: EventKind::Other {
                description: format!("unhandled event type: {}", type_of(raw)),
            },
        },
    }
}

fn build(reply_token: Option<String>, source: Option<&Source>, kind: EventKind) -> InboundEvent {
    InboundEvent {
        reply_token: reply_token.filter(|t| !t.is_empty()).map(ReplyToken::new),
        identity: identity_of(source),
        kind,
    }
}

fn identity_of(source: Option<&Source>) -> IdentityKey {
    match source {
        Some(s) => {
            let (user, room, group) = s.ids();
            IdentityKey::from_source_ids(user, room, group)
        }
        None => IdentityKey::unknown(),
    }
}

/// Best-effort identity for events whose body didn't decode.
fn identity_of_raw(raw: &Value) -> IdentityKey {
    let source = raw
        .get("source")
        .and_then(|s| serde_json::from_value::<Source>(s.clone()).ok());
    identity_of(source.as_ref())
}

fn type_of(raw: &Value) -> &str {
    raw.get("type").and_then(Value::as_str).unwrap_or("unknown")
}
