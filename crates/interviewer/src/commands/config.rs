//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to config file (overrides default discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration as TOML
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(args.config, ctx),
        ConfigCommand::Which => cmd_which(args.config),
        ConfigCommand::Path => cmd_path(),
    }
}

fn cmd_show(explicit: Option<PathBuf>, ctx: &Context) -> Result<()> {
    let loaded = super::load(explicit.as_deref())?;

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    let mut config = loaded.config;
    // Fill in defaults so every effective value is visible.
    config.server = Some(config.server());
    let mut storage = config.storage();
    if storage.access_token.is_some() {
        storage.access_token = Some("********".to_string());
    }
    config.storage = Some(storage);

    println!("# Interviewer Configuration\n");
    if ctx.verbose {
        for source in loaded.sources.iter().filter(|s| s.loaded) {
            println!("# from {}", source.path.display());
        }
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_which(explicit: Option<PathBuf>) -> Result<()> {
    let loaded = super::load(explicit.as_deref())?;

    println!("Config files (lowest to highest precedence):");
    for source in &loaded.sources {
        let marker = if source.loaded { "✓" } else { "·" };
        println!("  {} {}", marker, source.path.display());
    }
    println!("  + environment variables");

    for warning in &loaded.warnings {
        println!("warning: {}", warning);
    }
    Ok(())
}

fn cmd_path() -> Result<()> {
    match interviewer_config::xdg_config_path() {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("Could not determine a config directory for this platform"),
    }
    Ok(())
}
