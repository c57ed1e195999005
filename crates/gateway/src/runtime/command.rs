//! Command interpretation for inbound text.
//!
//! Only text carrying the configured prefix is processed.  After the prefix
//! is stripped the remainder is either a recognised command or content to
//! forward to the conversation service.

use lr_domain::config::RelayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a fresh conversation session for the identity.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// No prefix; the message is not addressed to the bot.
    Ignored,
    Command(Command),
    /// Prefix-stripped text to forward.
    Content(String),
}

#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    prefix: String,
    reset: String,
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

impl CommandInterpreter {
    pub fn new(prefix: impl Into<String>, reset_command: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            reset: reset_command.into().to_lowercase(),
        }
    }

    pub fn from_config(cfg: &RelayConfig) -> Self {
        Self::new(cfg.command_prefix.clone(), cfg.reset_command.clone())
    }

    /// Interpret raw message text.
    ///
    /// Must be applied to the text exactly as received.  Feeding it the
    /// already-stripped remainder yields `Ignored` unless that remainder
    /// happens to start with the prefix again.
    pub fn interpret(&self, text: &str) -> Interpretation {
        let Some(rest) = text.strip_prefix(self.prefix.as_str()) else {
            return Interpretation::Ignored;
        };

        if rest.to_lowercase() == self.reset {
            Interpretation::Command(Command::Reset)
        } else {
            Interpretation::Content(rest.to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprefixed_text_is_ignored() {
        let ci = CommandInterpreter::default();
        assert_eq!(ci.interpret("hello"), Interpretation::Ignored);
        assert_eq!(ci.interpret(""), Interpretation::Ignored);
        assert_eq!(ci.interpret(" @#hello"), Interpretation::Ignored);
    }

    #[test]
    fn reset_is_case_insensitive() {
        let ci = CommandInterpreter::default();
        for text in ["@#reset", "@#RESET", "@#Reset"] {
            assert_eq!(ci.interpret(text), Interpretation::Command(Command::Reset));
        }
    }

    #[test]
    fn reset_must_match_exactly() {
        let ci = CommandInterpreter::default();
        assert_eq!(
            ci.interpret("@#reset please"),
            Interpretation::Content("reset please".into())
        );
        assert_eq!(ci.interpret("@# reset"), Interpretation::Content(" reset".into()));
    }

    #[test]
    fn prefixed_text_is_content() {
        let ci = CommandInterpreter::default();
        assert_eq!(ci.interpret("@#hi there"), Interpretation::Content("hi there".into()));
        assert_eq!(ci.interpret("@#"), Interpretation::Content(String::new()));
    }

    #[test]
    fn stripped_text_does_not_reinterpret() {
        let ci = CommandInterpreter::default();
        let Interpretation::Content(rest) = ci.interpret("@#hi there") else {
            panic!("expected content");
        };
        assert_eq!(ci.interpret(&rest), Interpretation::Ignored);
    }

    #[test]
    fn custom_prefix_and_command() {
        let ci = CommandInterpreter::new("!bot ", "NEW");
        assert_eq!(ci.interpret("!bot new"), Interpretation::Command(Command::Reset));
        assert_eq!(ci.interpret("!bot hi"), Interpretation::Content("hi".into()));
        assert_eq!(ci.interpret("@#hi"), Interpretation::Ignored);
    }
}
