use lr_domain::error::Result;
use lr_domain::event::ReplyToken;

/// Outbound reply channel.  A reply token is single-use: call this at most
/// once per event.
#[async_trait::async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_reply(&self, token: &ReplyToken, text: &str) -> Result<()>;
}

/// Binary content attached to a message (images, video).
#[async_trait::async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>>;
}
