pub mod diff;
pub mod snapshot;

use dbsnap_core::logging_facility::{init, Profile};
use dbsnap_core::DbSnapConfig;
use dbsnap_store::{db, SqliteSource};
use std::path::Path;

/// Load `--config` if given, defaults otherwise
pub(crate) fn load_config(path: Option<&Path>) -> dbsnap_core::Result<DbSnapConfig> {
    match path {
        Some(path) => DbSnapConfig::load(path),
        None => Ok(DbSnapConfig::default()),
    }
}

pub(crate) fn init_logging(verbose: bool, profile: Profile) {
    if verbose {
        init(profile);
    }
}

/// Open an existing database file; the CLI never creates one
pub(crate) fn open_source(path: &Path) -> dbsnap_core::Result<SqliteSource> {
    let conn = db::open_read_only(path)?;
    Ok(SqliteSource::new(conn, path.display().to_string()))
}
