//! Config command - inspect and create the configuration file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use fiskal_core::FiskalConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,

    /// Write a configuration file with default values
    Init {
        /// Where to write the file (default: the user config directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print where the configuration file is read from
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map_or_else(default_config_path, PathBuf::from);

    match args.action {
        ConfigAction::Show => show(path),
        ConfigAction::Init { output, force } => init(output.unwrap_or(path), force),
        ConfigAction::Path => locate(path),
    }
}

/// `<user config dir>/fiskal/config.json`, or `./fiskal/config.json` without one.
pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("fiskal").join("config.json")
}

fn show(path: PathBuf) -> anyhow::Result<()> {
    let config = if path.is_file() {
        FiskalConfig::from_file(&path)?
    } else {
        eprintln!("{} {} not found, using defaults", style("ℹ").blue(), path.display());
        FiskalConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists, pass --force to replace it", path.display());
    }

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    FiskalConfig::default().save(&path)?;

    println!("{} Wrote default configuration to {}", style("✓").green(), path.display());
    Ok(())
}

fn locate(path: PathBuf) -> anyhow::Result<()> {
    let status = if path.is_file() {
        style("present").green()
    } else {
        style("not created, run `fiskal config init`").yellow()
    };

    println!("{} ({})", path.display(), status);
    Ok(())
}
