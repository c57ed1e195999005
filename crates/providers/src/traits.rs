use lr_domain::conversation::SessionHandle;
use lr_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generative-response service contracts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Multi-turn conversation backend.
///
/// Exactly two operations: open a session, and send one message into it.
/// Implementations are adapters that translate to a provider's wire format.
#[async_trait::async_trait]
pub trait ConversationService: Send + Sync {
    /// Open a new, empty conversation.  Must not block: the session store
    /// calls this while holding its lock.
    fn start_session(&self) -> SessionHandle;

    /// Send `text` as the next user turn and return the model's reply.
    /// On failure the session is left as it was.
    async fn send(&self, session: &SessionHandle, text: &str) -> Result<String>;
}

/// Single-shot image description.
#[async_trait::async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, image: &[u8]) -> Result<String>;
}
