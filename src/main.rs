mod analytics;
mod catalog;
mod cli;
mod error;
mod fmt;
mod importer;
mod models;
mod report;
mod settings;
mod validator;

use std::path::PathBuf;

use clap::Parser;

use cli::{Cli, Commands, RunArgs};
use settings::{default_settings_path, load_settings, shellexpand_path};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let settings_path = cli
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand_path(p)))
        .unwrap_or_else(default_settings_path);

    let result = match cli.command {
        None => cli::run::run(RunArgs::default(), load_settings(&settings_path)),
        Some(Commands::Run(args)) => cli::run::run(args, load_settings(&settings_path)),
        Some(Commands::Init) => cli::init::run(&settings_path),
        Some(Commands::Config) => cli::config::run(&settings_path),
    };

    if let Err(e) = result {
        eprintln!("\n[ERROR] Something went wrong during processing.");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
