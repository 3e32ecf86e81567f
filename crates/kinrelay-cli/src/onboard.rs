//! `kinrelay onboard` — write a default configuration file.

use anyhow::Result;
use colored::Colorize;

use kinrelay_core::config::{get_config_path, load_config, save_config};
use kinrelay_core::utils::get_history_path;

pub fn run() -> Result<()> {
    println!();
    println!("{}", "kinrelay setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        // Defaults plus anything already set through the environment
        let config = load_config(Some(&config_path));
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    std::fs::create_dir_all(get_history_path())?;

    println!();
    println!(
        "  Set {} and {} in the config, or run {} and follow the prompts.",
        "apiKey".bold(),
        "aiId".bold(),
        "kinrelay chat".bold()
    );
    println!();

    Ok(())
}
