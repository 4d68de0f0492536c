// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Todosync CLI
//!
//! Command-line interface for todosync - one-way sync of an item list into
//! a Home Assistant to-do list.

mod commands;
mod config;
mod display;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "todosync")]
#[command(version, about = "One-way sync into a Home Assistant to-do list")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Options file (default: /data/options.json, then data/options.json)
    #[arg(long, global = true, env = "TODOSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Items file, overriding `items_file` from the options
    #[arg(long, global = true, env = "TODOSYNC_ITEMS")]
    items: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle
    Sync,

    /// Run sync cycles on the configured interval
    Watch {
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Show the to-do list
    Items {
        /// Include completed items
        #[arg(long)]
        all: bool,
    },

    /// Add one item to the to-do list
    Add {
        /// Item text
        text: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("todosync=info".parse()?))
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        display::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "todosync", &mut io::stdout());
        return Ok(());
    }

    init_logging()?;
    let config = CliConfig::load(cli.config.as_deref(), cli.items)?;

    match cli.command {
        Commands::Sync => commands::sync::run(&config)?,
        Commands::Watch { cycles } => commands::sync::watch(&config, cycles)?,
        Commands::Items { all } => commands::items::list(&config, all)?,
        Commands::Add { text } => commands::add::run(&config, &text)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_with_cycles() {
        let cli = Cli::try_parse_from(["todosync", "watch", "--cycles", "2"]).unwrap();
        assert!(matches!(cli.command, Commands::Watch { cycles: Some(2) }));
    }

    #[test]
    fn test_parse_add_with_global_config() {
        let cli =
            Cli::try_parse_from(["todosync", "add", "Milk", "--config", "/tmp/options.json"])
                .unwrap();
        assert!(matches!(cli.command, Commands::Add { ref text } if text == "Milk"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/options.json")));
    }
}
