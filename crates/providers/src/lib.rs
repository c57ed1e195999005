pub mod google;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use google::GeminiClient;
pub use traits::{ConversationService, ImageDescriber};
pub use util::api_key_from_env;
