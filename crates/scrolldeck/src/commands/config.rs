use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    println!("  {:<24} {}", "defaults.theme", config.theme().cyan());
    println!(
        "  {:<24} {}",
        "defaults.threshold",
        config.threshold().to_string().cyan()
    );
    let tracking = match config.tracking() {
        crate::config::Tracking::Auto => "auto",
        crate::config::Tracking::Off => "off",
    };
    println!("  {:<24} {}", "defaults.tracking", tracking.cyan());
    let start = config
        .start_slide()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "first".to_string());
    println!("  {:<24} {}", "defaults.start_slide", start.cyan());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
