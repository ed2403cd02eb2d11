//! Snapshot command
//!
//! Usage: dbsnap snapshot --db <FILE> (--table <NAME> | --query <SQL>)

use clap::Args;
use dbsnap_core::{build_snapshot, ColumnFilter, SourceRef};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// SQLite database file
    #[arg(long)]
    pub db: PathBuf,

    #[arg(long, conflicts_with = "query", required_unless_present = "query")]
    pub table: Option<String>,

    /// SQL request to snapshot instead of a table
    #[arg(long)]
    pub query: Option<String>,

    /// Only these columns, in this order (comma separated)
    #[arg(long, value_delimiter = ',', requires = "table")]
    pub include: Vec<String>,

    /// Leave these columns out (comma separated)
    #[arg(long, value_delimiter = ',', requires = "table")]
    pub exclude: Vec<String>,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SnapshotArgs {
    fn source_ref(&self) -> Result<SourceRef, Box<dyn std::error::Error>> {
        let source_ref = match (&self.table, &self.query) {
            (Some(table), _) => {
                let filter = ColumnFilter {
                    include: (!self.include.is_empty()).then(|| self.include.clone()),
                    exclude: self.exclude.clone(),
                };
                SourceRef::table_with(table.clone(), filter)
            }
            (None, Some(sql)) => SourceRef::request(sql.clone()),
            (None, None) => return Err("Must specify either --table or --query".into()),
        };
        Ok(source_ref)
    }
}

/// # Errors
///
/// Config, database and snapshot failures, reported by `main`.
pub fn execute(args: SnapshotArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.config.as_deref())?;
    super::init_logging(verbose, config.logging.profile);

    let source = super::open_source(&args.db)?;
    let snapshot = build_snapshot(&source, &args.source_ref()?)?;

    println!("{}", snapshot.to_json()?);
    Ok(())
}
