mod line;
mod llm;
mod observability;
mod recorder;
mod relay;
mod server;

pub use line::*;
pub use llm::*;
pub use observability::*;
pub use recorder::*;
pub use relay::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.  Secret checks read
    /// the environment, so results can differ between machines.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if !self.server.callback_path.starts_with('/') {
            errors.push(ConfigError::error(
                "server.callback_path",
                "callback path must start with '/'",
            ));
        }

        if self.relay.command_prefix.is_empty() {
            errors.push(ConfigError::error(
                "relay.command_prefix",
                "command prefix must not be empty (every text message would be relayed)",
            ));
        }
        if self.relay.reset_command.trim().is_empty() {
            errors.push(ConfigError::error(
                "relay.reset_command",
                "reset command must not be empty",
            ));
        }

        for (field, temp) in [
            ("llm.chat_temperature", self.llm.chat_temperature),
            ("llm.image_temperature", self.llm.image_temperature),
        ] {
            if !(0.0..=2.0).contains(&temp) {
                errors.push(ConfigError::error(
                    field,
                    format!("temperature {temp} is outside 0.0–2.0"),
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError::error(
                "observability.sample_rate",
                "sample rate must be within 0.0–1.0",
            ));
        }

        for (field, env_var) in [
            ("line.channel_secret_env", &self.line.channel_secret_env),
            ("line.channel_access_token_env", &self.line.channel_access_token_env),
            ("llm.api_key_env", &self.llm.api_key_env),
        ] {
            if std::env::var(env_var).map(|v| v.is_empty()).unwrap_or(true) {
                errors.push(ConfigError::warning(
                    field,
                    format!("environment variable {env_var} is not set"),
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hard_errors(cfg: &Config) -> Vec<ConfigError> {
        cfg.validate()
            .into_iter()
            .filter(|e| e.severity == ConfigSeverity::Error)
            .collect()
    }

    #[test]
    fn defaults_have_no_hard_errors() {
        assert!(hard_errors(&Config::default()).is_empty());
    }

    #[test]
    fn empty_prefix_is_an_error() {
        let mut cfg = Config::default();
        cfg.relay.command_prefix = String::new();
        let errs = hard_errors(&cfg);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "relay.command_prefix");
    }

    #[test]
    fn callback_path_must_be_absolute() {
        let mut cfg = Config::default();
        cfg.server.callback_path = "callback".into();
        assert!(hard_errors(&cfg)
            .iter()
            .any(|e| e.field == "server.callback_path"));
    }

    #[test]
    fn temperature_out_of_range() {
        let mut cfg = Config::default();
        cfg.llm.image_temperature = 3.5;
        let errs = hard_errors(&cfg);
        assert!(errs.iter().any(|e| e.field == "llm.image_temperature"));
    }

    #[test]
    fn display_tags_severity() {
        let e = ConfigError::warning("line.channel_secret_env", "missing");
        assert_eq!(e.to_string(), "[WARN] line.channel_secret_env: missing");
    }
}
