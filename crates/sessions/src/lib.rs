//! Conversation-session state for the relay.
//!
//! One live conversation per identity key, held in memory for the life of
//! the process, plus an optional append-only recorder of relayed messages.

pub mod recorder;
pub mod store;

pub use recorder::{FileRecorder, MessageRecorder};
pub use store::{MemorySessionStore, SessionEntry, SessionStore};
