//! Relay runtime: classification, command interpretation, reply
//! composition and per-event dispatch.

pub mod classify;
pub mod command;
pub mod compose;
pub mod dispatch;
pub mod identity_lock;

pub use dispatch::{Collaborators, Dispatcher, Outcome};
