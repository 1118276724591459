//! MenuGraph CLI
//!
//! Imports catalog payloads into the on-disk store and inspects it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use menugraph_core::logging_facility::{init_with_filter, Profile};

mod commands;
mod context;

#[derive(Debug, Parser)]
#[command(name = "menugraph")]
#[command(about = "MenuGraph - cached food catalog on a persistent object graph", long_about = None)]
struct Cli {
    /// SQLite database (overrides `[store] db_path`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true, default_value = context::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log filter directive used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Refresh the catalog from a JSON payload file
    Refresh(commands::refresh::RefreshArgs),
    /// Show staleness, bookkeeping and object counts
    Status,
    /// List the dishes of one category
    Dishes(commands::dishes::DishesArgs),
    /// Cascade-delete a dish and everything it owns
    Delete(commands::delete::DeleteArgs),
    /// Print a deep copy of a dish as JSON
    Snapshot(commands::snapshot::SnapshotArgs),
}

fn main() {
    let cli = Cli::parse();

    let profile = if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    };
    init_with_filter(
        profile,
        Some(cli.log_level.as_deref().unwrap_or("menugraph=warn")),
    );

    let result = context::Context::load(cli.db, &cli.config).and_then(|mut ctx| match cli.command {
        Commands::Refresh(args) => commands::refresh::execute(&mut ctx, args),
        Commands::Status => commands::status::execute(&ctx),
        Commands::Dishes(args) => commands::dishes::execute(&ctx, args),
        Commands::Delete(args) => commands::delete::execute(&mut ctx, args),
        Commands::Snapshot(args) => commands::snapshot::execute(&ctx, args),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
