use dbsnap_core::{
    DataSource, DbSnapError, RawCell, Result, SchemaDescription, Snapshot, SourceDescription,
    SourceRef, Value,
};
use std::cell::RefCell;

/// One table of the in-memory source
#[derive(Debug, Clone)]
pub struct FakeTable {
    pub name: String,
    pub columns: Vec<String>,
    pub primary_keys: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

/// In-memory data source for reader and recorder tests
///
/// Requests must read `select * from <table>`; anything else is unavailable.
#[derive(Debug, Default)]
pub struct FakeSource {
    tables: RefCell<Vec<FakeTable>>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, name: &str, columns: &[&str], primary_keys: &[&str]) {
        self.tables.borrow_mut().push(FakeTable {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            primary_keys: primary_keys.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        });
    }

    pub fn drop_table(&self, name: &str) {
        self.tables
            .borrow_mut()
            .retain(|t| !t.name.eq_ignore_ascii_case(name));
    }

    pub fn insert(&self, table: &str, row: Vec<RawCell>) {
        self.with_table(table, |t| t.rows.push(row));
    }

    pub fn update(&self, table: &str, index: usize, row: Vec<RawCell>) {
        self.with_table(table, |t| t.rows[index] = row);
    }

    pub fn delete(&self, table: &str, index: usize) {
        self.with_table(table, |t| {
            t.rows.remove(index);
        });
    }

    fn with_table(&self, table: &str, f: impl FnOnce(&mut FakeTable)) {
        let mut tables = self.tables.borrow_mut();
        let t = tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(table))
            .expect("table exists");
        f(t);
    }

    fn lookup(&self, source: &SourceRef) -> Result<FakeTable> {
        let name = match source {
            SourceRef::Table { name, .. } => name.clone(),
            SourceRef::Request { sql } => sql
                .to_lowercase()
                .strip_prefix("select * from ")
                .map(|t| t.trim().to_string())
                .ok_or_else(|| unavailable(sql))?,
        };
        self.tables
            .borrow()
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(&name))
            .cloned()
            .ok_or_else(|| unavailable(&name))
    }
}

fn unavailable(name: &str) -> DbSnapError {
    DbSnapError::SourceUnavailable {
        source_name: name.to_string(),
        reason: "no such table".to_string(),
    }
}

impl DataSource for FakeSource {
    fn description(&self) -> String {
        "fake".to_string()
    }

    fn describe_schema(&self, source: &SourceRef) -> Result<SchemaDescription> {
        let table = self.lookup(source)?;
        let primary_key_names = match source {
            SourceRef::Table { .. } => table.primary_keys,
            SourceRef::Request { .. } => Vec::new(),
        };
        Ok(SchemaDescription {
            column_names: table.columns,
            primary_key_names,
        })
    }

    fn fetch_rows(&self, source: &SourceRef, columns: &[String]) -> Result<Vec<Vec<RawCell>>> {
        let table = self.lookup(source)?;
        let indexes: Vec<usize> = columns
            .iter()
            .map(|c| {
                table
                    .columns
                    .iter()
                    .position(|t| t.eq_ignore_ascii_case(c))
                    .ok_or_else(|| unavailable(c))
            })
            .collect::<Result<_>>()?;
        Ok(table
            .rows
            .iter()
            .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
            .collect())
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.borrow().iter().map(|t| t.name.clone()).collect())
    }
}

/// Table snapshot built directly from values
#[allow(dead_code)]
pub fn table_snapshot(
    name: &str,
    columns: &[&str],
    primary_keys: &[&str],
    rows: Vec<Vec<Value>>,
) -> Snapshot {
    Snapshot::new(
        SourceDescription::table(name),
        columns.iter().map(|c| c.to_string()).collect(),
        primary_keys.iter().map(|c| c.to_string()).collect(),
        rows,
    )
    .expect("valid snapshot")
}

/// `(id, name)` row
#[allow(dead_code)]
pub fn id_name(id: i64, name: &str) -> Vec<Value> {
    vec![Value::from(id), Value::from(name)]
}

#[allow(dead_code)]
pub fn text(s: &str) -> RawCell {
    RawCell::Text(s.to_string())
}
