//! Diff command
//!
//! Usage: dbsnap diff --before <FILE> --after <FILE> [--table <NAME>]...

use clap::{Args, ValueEnum};
use dbsnap_core::{
    build_schema_snapshot, build_snapshot, Change, ChangeDetector, ChangeType, Changes,
    DataSource, Snapshot, SourceRef,
};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Database file at the start point
    #[arg(long)]
    pub before: PathBuf,

    /// Database file at the end point
    #[arg(long)]
    pub after: PathBuf,

    /// Tables to compare (every table when omitted)
    #[arg(long)]
    pub table: Vec<String>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// # Errors
///
/// Config, database and detection failures, reported by `main`.
pub fn execute(args: DiffArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.config.as_deref())?;
    super::init_logging(verbose, config.logging.profile);

    let before = super::open_source(&args.before)?;
    let after = super::open_source(&args.after)?;
    let before_snapshots = snapshots(&before, &args.table)?;
    let after_snapshots = snapshots(&after, &args.table)?;

    let changes = ChangeDetector::new(config.detector)
        .detect_all(&before_snapshots, &after_snapshots)?
        .with_source(after.description());

    match args.format {
        OutputFormat::Json => println!("{}", changes.to_json()?),
        OutputFormat::Text => print!("{}", render_text(&changes)),
    }
    Ok(())
}

fn snapshots<D: DataSource>(source: &D, tables: &[String]) -> dbsnap_core::Result<Vec<Snapshot>> {
    if tables.is_empty() {
        return build_schema_snapshot(source);
    }
    tables
        .iter()
        .map(|table| build_snapshot(source, &SourceRef::table(table.clone())))
        .collect()
}

/// One line per change, then one indented line per modified column
fn render_text(changes: &Changes) -> String {
    let mut out = String::new();
    for change in changes.iter() {
        let _ = writeln!(out, "{}", headline(change));
        if change.change_type() != ChangeType::Modification {
            continue;
        }
        for index in change.modified_column_indexes() {
            if let Ok(column) = change.column_values(index) {
                let _ = writeln!(
                    out,
                    "  {}: {} -> {}",
                    column.name,
                    show(column.before.as_ref()),
                    show(column.after.as_ref())
                );
            }
        }
    }
    let _ = writeln!(
        out,
        "{} change(s): {} creation(s), {} modification(s), {} deletion(s)",
        changes.len(),
        changes.count_of(ChangeType::Creation),
        changes.count_of(ChangeType::Modification),
        changes.count_of(ChangeType::Deletion)
    );
    out
}

fn headline(change: &Change) -> String {
    let keys = change.primary_key_values();
    if keys.is_empty() {
        return format!("{} {}", change.change_type(), change.table_name());
    }
    let keys = keys
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {} [{}]", change.change_type(), change.table_name(), keys)
}

fn show(value: Option<&dbsnap_core::Value>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsnap_core::{detect_changes, SourceDescription, Value};

    fn people(rows: Vec<Vec<Value>>) -> Snapshot {
        Snapshot::new(
            SourceDescription::table("people"),
            vec!["id".to_string(), "name".to_string()],
            vec!["id".to_string()],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_render_text_lists_modified_columns() {
        let before = people(vec![vec![Value::from(1), Value::from("A")]]);
        let after = people(vec![
            vec![Value::from(1), Value::from("B")],
            vec![Value::from(2), Value::from("C")],
        ]);
        let changes = detect_changes(Some(&before), Some(&after)).unwrap();

        let text = render_text(&changes);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "MODIFICATION people [1]");
        assert_eq!(lines[1], "  name: A -> B");
        assert_eq!(lines[2], "CREATION people [2]");
        assert_eq!(
            lines[3],
            "2 change(s): 1 creation(s), 1 modification(s), 0 deletion(s)"
        );
    }
}
