//! Skilltag CLI - Tag research papers with skills from a taxonomy.

use anyhow::Context;
use clap::Parser;
use skilltag_cli::commands;
use skilltag_cli::{Cli, Command, Config, Formatter};
use skilltag_store::SqliteStore;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path.clone());

    match cli.command {
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter)?,
        Command::Extract(args) => {
            let mut store = open_store(&db_path)?;
            commands::execute_extract(args, &config, &mut store, &formatter)?;
        }
        Command::Import(args) => commands::execute_import(args, &mut open_store(&db_path)?, &formatter)?,
        Command::Papers(args) => commands::execute_papers(args, &mut open_store(&db_path)?, &formatter)?,
        Command::Skills(args) => commands::execute_skills(args, &open_store(&db_path)?, &formatter)?,
    }

    Ok(())
}

fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
    tracing::debug!("Opening database {}", path.display());
    SqliteStore::new(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Send logs to stderr so stdout stays machine-readable
///
/// `RUST_LOG` takes precedence over the `-v` level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
