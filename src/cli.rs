// CLI module - command-line parsing and the config subcommand
//
// inline-nav                  run the console demo
// inline-nav demo             same, spelled out
// inline-nav config --show    effective configuration as TOML
// inline-nav config --path    where the config file lives
// inline-nav config --reset   rewrite the file from defaults (--yes skips the prompt)

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inline_nav::config::{Config, VERSION};
use std::io::Write;
use std::path::PathBuf;

/// Callback routing and ephemeral view state for inline chat buttons
#[derive(Parser)]
#[command(name = "inline-nav", version = VERSION, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or reset the config file
    Config(ConfigArgs),
    /// Run the console demo bot
    Demo,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub action: ConfigAction,

    /// Do not ask before overwriting
    #[arg(long, requires = "reset")]
    pub yes: bool,
}

/// Exactly one of these must be given
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ConfigAction {
    /// Print the effective configuration (env > file > defaults)
    #[arg(long)]
    pub show: bool,

    /// Print the config file location
    #[arg(long)]
    pub path: bool,

    /// Overwrite the config file with defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run a CLI-only command. `Ok(true)` means the process should exit.
pub fn handle_cli() -> Result<bool> {
    match Cli::parse().command {
        Some(Commands::Config(args)) => {
            if args.action.path {
                println!("{}", config_path()?.display());
            } else if args.action.show {
                show_config()?;
            } else {
                reset_config(args.yes)?;
            }
            Ok(true)
        }
        Some(Commands::Demo) | None => Ok(false),
    }
}

fn config_path() -> Result<PathBuf> {
    Config::config_path().context("could not determine the config directory")
}

fn show_config() -> Result<()> {
    let config = Config::from_env()?;
    let path = config_path()?;

    println!("# Effective configuration (env > file > defaults)");
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults, {} does not exist", path.display());
    }
    println!();
    print!("{}", config.to_toml());
    Ok(())
}

fn reset_config(yes: bool) -> Result<()> {
    let path = config_path()?;

    if path.exists() && !yes && !confirm(&format!("Overwrite {}?", path.display()))? {
        println!("Aborted.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
