// CLI module - command-line argument parsing and handlers
//
// Without a subcommand the binary runs the panel demo. Subcommands manage
// the config file:
// - config --show: Display effective configuration
// - config --path: Print the config file location
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR

use crate::config::{Config, VERSION};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// panelkit - composable terminal panels
#[derive(Parser)]
#[command(name = "panelkit")]
#[command(version = VERSION)]
#[command(about = "Composable terminal panels demo", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli() -> bool {
    let Some(Commands::Config {
        show,
        reset,
        edit,
        path,
    }) = Cli::parse().command
    else {
        return false; // No subcommand, run the demo
    };

    let outcome = if path {
        config_file().map(|p| println!("{}", p.display()))
    } else if show {
        show_effective_config();
        Ok(())
    } else if reset {
        reset_config_file(&mut std::io::stdin().lock())
    } else if edit {
        edit_config_file()
    } else {
        print!("{}", CONFIG_USAGE);
        Ok(())
    };

    if let Err(e) = outcome {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    true
}

const CONFIG_USAGE: &str = "\
Usage: panelkit config [--show|--reset|--edit|--path]

Options:
  --show    Display effective configuration
  --reset   Reset config file to defaults
  --edit    Open config file in $EDITOR
  --path    Show config file path
";

fn config_file() -> Result<PathBuf> {
    Config::config_path().context("Could not determine config path (no home directory)")
}

fn show_effective_config() {
    let template = Config::from_env().to_toml();
    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", template.trim_start_matches("# panelkit configuration\n"));
    println!();

    let source = match Config::config_path() {
        Some(path) if path.exists() => path.display().to_string(),
        Some(_) => "defaults (no config file)".to_string(),
        None => return,
    };
    println!("# Source: {}", source);
}

/// Overwrite the config file with the default template. An existing file is
/// only replaced after a `y` answer on `answers`.
fn reset_config_file(answers: &mut impl BufRead) -> Result<()> {
    let path = config_file()?;
    if path.exists() {
        eprint!("Config file exists at {}. Overwrite? [y/N] ", path.display());
        std::io::stderr().flush().ok();
        if !confirmed(answers) {
            println!("Aborted.");
            return Ok(());
        }
    }
    write_default_config(&path)?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn confirmed(answers: &mut impl BufRead) -> bool {
    let mut line = String::new();
    answers.read_line(&mut line).is_ok() && line.trim().eq_ignore_ascii_case("y")
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(path, Config::default().to_toml())
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn edit_config_file() -> Result<()> {
    let path = config_file()?;
    if !path.exists() {
        write_default_config(&path)?;
        println!("Created new config file: {}", path.display());
    }

    let editor = editor_command(|name| std::env::var(name).ok());
    println!("Opening {} with {}", path.display(), editor);
    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor '{}' (set $EDITOR)", editor))?;
    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

/// `$EDITOR`, then `$VISUAL`, then the platform's stock editor
fn editor_command(var: impl Fn(&str) -> Option<String>) -> String {
    ["EDITOR", "VISUAL"]
        .into_iter()
        .filter_map(|name| var(name))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| {
            let stock = if cfg!(windows) { "notepad" } else { "nano" };
            stock.to_string()
        })
}
