use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::{Config, KEYS};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    println!("{} {}", "Config file:".bold(), path.display());

    let config = match Config::load_from(&path) {
        Ok(config) => config,
        Err(_) if !path.exists() => {
            println!("{}", "(not created yet, showing defaults)".dimmed());
            Config::default()
        }
        Err(e) => return Err(e),
    };

    println!();
    println!("{}", serde_yaml::to_string(&config)?.trim_end());
    println!();
    println!("{}", "Effective values:".bold());
    println!("  viewer id   {}", config.viewer_id());
    println!("  room        {}", config.room(None));
    println!("  theme       {}", config.theme().unwrap_or("light"));
    match config.store_location(None, false) {
        Ok(location) => println!("  store       {location:?}"),
        Err(e) => println!("  store       {}", e.to_string().red()),
    }
    println!();
    println!("{} {}", "Keys:".bold(), KEYS.join(", ").dimmed());
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
