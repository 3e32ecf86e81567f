//! `kinrelay status` — show configuration status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use kinrelay_core::config::load_config;
use kinrelay_core::utils::mask_secret;

pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(Some(config_path));

    println!();
    println!("{}", "kinrelay status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Endpoint:".bold(), config.api_endpoint);
    println!("  {:<18} {}", "API key:".bold(), describe(&mask_secret(&config.api_key)));
    println!("  {:<18} {}", "AI id:".bold(), describe(&config.ai_id));
    println!(
        "  {:<18} {}",
        "Timeouts:".bold(),
        format!(
            "session {}s | sweep {}s | request {}s",
            config.session_timeout, config.sweep_interval, config.request_timeout
        )
        .dimmed()
    );
    println!(
        "  {:<18} {}",
        "Console channel:".bold(),
        if config.channels.console.enabled {
            format!("{} (user \"{}\")", "✓".green(), config.channels.console.user_id)
        } else {
            format!("{}", "· disabled".dimmed())
        }
    );

    println!();
    if config.is_configured() {
        println!("  {}", "Ready to relay.".green());
    } else {
        println!(
            "  {}",
            "Setup incomplete: send `api_key:<key>` and `ai_id:<id>` in chat.".yellow()
        );
    }
    println!();

    Ok(())
}

fn describe(value: &str) -> String {
    if value.trim().is_empty() {
        format!("{}", "· not set".dimmed())
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_empty_and_set() {
        assert!(describe("  ").contains("not set"));
        assert_eq!(describe("abc"), "abc");
    }

    #[test]
    fn run_on_missing_config_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("missing.json")).is_ok());
    }
}
