//! dbsnap CLI
//!
//! Snapshot a SQLite table or request, or list the changes between two
//! database files.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "dbsnap")]
#[command(about = "dbsnap - Relational data snapshots and change detection", long_about = None)]
struct Cli {
    /// Log to stderr with the configured profile
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a table or request snapshot as JSON
    Snapshot(commands::snapshot::SnapshotArgs),
    /// Print the changes from one database file to another
    Diff(commands::diff::DiffArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Snapshot(args) => commands::snapshot::execute(args, cli.verbose),
        Commands::Diff(args) => commands::diff::execute(args, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
