use lr_domain::config::{Config, ConfigSeverity};

/// Validate the config, printing any issues.  Returns `false` when errors
/// were found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
/// The inline API token is masked.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let mut redacted = config.clone();
    if redacted.server.api_token.is_some() {
        redacted.server.api_token = Some("********".into());
    }
    let output = toml::to_string_pretty(&redacted)?;
    print!("{output}");
    Ok(())
}
