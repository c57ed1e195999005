pub mod config;

use clap::{Parser, Subcommand};

use lr_domain::config::Config;

/// linerelay: relays LINE chat messages to Gemini.
#[derive(Debug, Parser)]
#[command(name = "linerelay", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the webhook server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `LR_CONFIG` (or `config.toml`
/// by default), then apply the `PORT` override.  A missing file yields the
/// defaults.  Returns the parsed [`Config`] and the path that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("LR_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let mut config = parse_config_file(&config_path)?;
    config
        .server
        .apply_port_override(std::env::var("PORT").ok().as_deref());

    Ok((config, config_path))
}

fn parse_config_file(config_path: &str) -> anyhow::Result<Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}
