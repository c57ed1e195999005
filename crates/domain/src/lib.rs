//! Shared types for the LINE relay: configuration, errors, structured trace
//! events, identity keys, classified inbound events and the opaque
//! conversation-session handle.

pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod identity;
pub mod trace;
