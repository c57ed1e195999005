use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Relay behaviour (commands, priming, canned replies)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Text messages must start with this marker to be processed at all.
    #[serde(default = "d_prefix")]
    pub command_prefix: String,
    /// Compared case-insensitively after the prefix is stripped.
    #[serde(default = "d_reset")]
    pub reset_command: String,
    /// Prepended to the first text a new conversation session sees.
    #[serde(default = "d_preamble")]
    pub priming_preamble: String,
    /// Static reply confirming a reset.
    #[serde(default = "d_greeting")]
    pub reset_greeting: String,
    /// Instruction sent alongside an image for description.
    #[serde(default = "d_image_prompt")]
    pub image_prompt: String,
    /// Prefix of the reply when an image cannot be described; the error
    /// text is appended.
    #[serde(default = "d_image_failure")]
    pub image_failure_reply: String,
    /// Prefix of the reply when the conversation service fails.
    #[serde(default = "d_conversation_failure")]
    pub conversation_failure_reply: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            command_prefix: d_prefix(),
            reset_command: d_reset(),
            priming_preamble: d_preamble(),
            reset_greeting: d_greeting(),
            image_prompt: d_image_prompt(),
            image_failure_reply: d_image_failure(),
            conversation_failure_reply: d_conversation_failure(),
        }
    }
}

fn d_prefix() -> String {
    "@#".into()
}
fn d_reset() -> String {
    "reset".into()
}
fn d_preamble() -> String {
    "You are a helpful assistant with precise and logical thinking. ".into()
}
fn d_greeting() -> String {
    "Nice to meet you! I'm Gemini. What would you like to know?".into()
}
fn d_image_prompt() -> String {
    "Describe this image in precise detail. If the image contains text, transcribe it.".into()
}
fn d_image_failure() -> String {
    "Sorry, I couldn't recognize this image, please try again: ".into()
}
fn d_conversation_failure() -> String {
    "Sorry, I couldn't get an answer right now, please try again later: ".into()
}
