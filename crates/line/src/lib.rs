//! LINE Messaging API collaborator.
//!
//! Webhook wire types, `X-Line-Signature` verification, and the two outbound
//! calls the relay needs: reply to an event and fetch message content.

pub mod client;
pub mod signature;
pub mod traits;
pub mod webhook;

pub use client::MessagingClient;
pub use signature::verify_signature;
pub use traits::{ContentFetcher, ReplySink};
pub use webhook::CallbackRequest;
