//! ronda library root.
//! Exposes the CLI parser, the high-level run() function and the patrol
//! modules (registries, attendance verifier, fine engine, ledger bridge).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Backup { .. } => cli::commands::backup::handle(&cli.command, cfg),
        Commands::Shift { .. } => cli::commands::shift::handle(&cli.command, cfg),
        Commands::Checkpoint { .. } => cli::commands::checkpoint::handle(&cli.command, cfg),
        Commands::Roster { .. } => cli::commands::roster::handle(&cli.command, cfg),
        Commands::Checkin(_) | Commands::Checkout(_) => {
            cli::commands::attendance::handle(&cli.command, cfg)
        }
        Commands::Policy { .. } => cli::commands::policy::handle(&cli.command, cfg),
        Commands::Evaluate { .. } => cli::commands::evaluate::handle(&cli.command, cfg),
        Commands::Fines { .. } => cli::commands::fines::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once; command-line flags win over the file
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }
    if let Some(nb) = cli.neighborhood {
        cfg.neighborhood_id = nb;
    }

    dispatch(&cli, &cfg)
}
