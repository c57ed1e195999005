//! Identity keys: the stable origin of an inbound event.
//!
//! A LINE webhook source is one of user, group or room.  The key is the user
//! ID when present (so a person keeps one conversation across the chats they
//! share with the bot), otherwise the room ID, otherwise the group ID.  A
//! source never carries both a room and a group.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which source field the identity was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    User,
    Room,
    Group,
    /// No identity field was populated.
    Unknown,
}

/// Stable key identifying the originator of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    kind: SourceKind,
    id: String,
}

impl IdentityKey {
    /// Derive a key from the optional source IDs using
    /// user > room > group precedence.  Empty strings count as absent.
    pub fn from_source_ids(
        user_id: Option<&str>,
        room_id: Option<&str>,
        group_id: Option<&str>,
    ) -> Self {
        let pick = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_owned);

        if let Some(id) = pick(user_id) {
            Self { kind: SourceKind::User, id }
        } else if let Some(id) = pick(room_id) {
            Self { kind: SourceKind::Room, id }
        } else if let Some(id) = pick(group_id) {
            Self { kind: SourceKind::Group, id }
        } else {
            Self::unknown()
        }
    }

    /// The empty key: no session identity.
    pub fn unknown() -> Self {
        Self {
            kind: SourceKind::Unknown,
            id: String::new(),
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::User,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// `true` when no identity could be derived.  Callers must skip any
    /// session interaction for such events.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Directory name used by the message recorder, e.g. `UserID_U123`.
    /// Characters outside `[A-Za-z0-9_-]` become `_`, so the name is always
    /// a single path component.
    pub fn folder_name(&self) -> String {
        let prefix = match self.kind {
            SourceKind::User => "UserID",
            SourceKind::Room => "RoomID",
            SourceKind::Group => "GroupID",
            SourceKind::Unknown => "Unknown",
        };
        let id: String = self
            .id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{prefix}_{id}")
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
