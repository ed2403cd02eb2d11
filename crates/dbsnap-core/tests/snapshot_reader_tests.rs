#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{text, FakeSource};
use dbsnap_core::{
    build_schema_snapshot, build_snapshot, ColumnFilter, DbSnapError, RawCell, SnapshotNavigator,
    SourceKind, SourceRef, Value, ValueType,
};

fn movie_source() -> FakeSource {
    let source = FakeSource::new();
    source.add_table("movie", &["ID", "Title", "Year"], &["ID"]);
    source.insert(
        "movie",
        vec![RawCell::Integer(1), text("Alien"), RawCell::Integer(1979)],
    );
    source.insert(
        "movie",
        vec![RawCell::Integer(2), text("Avatar"), RawCell::Null],
    );
    source
}

#[test]
fn test_full_table_snapshot() {
    let snapshot = build_snapshot(&movie_source(), &SourceRef::table("movie")).unwrap();

    assert_eq!(snapshot.source().kind, SourceKind::Table);
    assert_eq!(snapshot.column_names(), &["ID", "Title", "Year"]);
    assert_eq!(snapshot.primary_key_names(), &["ID"]);
    assert_eq!(snapshot.row_count(), 2);
    assert_eq!(snapshot.rows()[1].value_named("year").unwrap(), &Value::Null);
    assert_eq!(
        snapshot.column(0).unwrap().values()[0].value_type(),
        ValueType::Number
    );
}

#[test]
fn test_inclusion_list_orders_columns() {
    let source_ref = SourceRef::table_with("movie", ColumnFilter::including(["year", "title"]));
    let snapshot = build_snapshot(&movie_source(), &source_ref).unwrap();

    assert_eq!(snapshot.column_names(), &["Year", "Title"]);
    assert_eq!(
        snapshot.rows()[0].values(),
        &[Value::from(1979), Value::from("Alien")]
    );
}

#[test]
fn test_excluded_key_is_still_reported() {
    let source_ref = SourceRef::table_with("movie", ColumnFilter::excluding(["id"]));
    let snapshot = build_snapshot(&movie_source(), &source_ref).unwrap();

    assert_eq!(snapshot.column_names(), &["Title", "Year"]);
    assert_eq!(snapshot.primary_key_names(), &["ID"]);
    assert!(!snapshot.has_usable_primary_key());
}

#[test]
fn test_unknown_column_in_filter() {
    let source_ref = SourceRef::table_with("movie", ColumnFilter::including(["budget"]));
    let err = build_snapshot(&movie_source(), &source_ref).unwrap_err();
    assert_eq!(
        err,
        DbSnapError::ColumnNotFound {
            table: "movie".to_string(),
            column: "budget".to_string(),
        }
    );
}

#[test]
fn test_missing_table_is_unavailable() {
    let err = build_snapshot(&movie_source(), &SourceRef::table("actor")).unwrap_err();
    assert!(matches!(err, DbSnapError::SourceUnavailable { .. }));
}

#[test]
fn test_request_has_no_declared_keys() {
    let snapshot =
        build_snapshot(&movie_source(), &SourceRef::request("select * from movie")).unwrap();
    assert_eq!(snapshot.source().kind, SourceKind::Request);
    assert!(snapshot.primary_key_names().is_empty());
    assert_eq!(snapshot.row_count(), 2);
}

#[test]
fn test_schema_snapshot_follows_declaration_order() {
    let source = movie_source();
    source.add_table("actor", &["id", "name"], &["id"]);
    source.add_table("casting", &["movie_id", "actor_id"], &["movie_id", "actor_id"]);

    let snapshots = build_schema_snapshot(&source).unwrap();

    let names: Vec<_> = snapshots.iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["movie", "actor", "casting"]);
    assert_eq!(snapshots[2].primary_key_names(), &["movie_id", "actor_id"]);
}

#[test]
fn test_navigating_a_snapshot() {
    let snapshot = build_snapshot(&movie_source(), &SourceRef::table("movie")).unwrap();
    let mut nav = SnapshotNavigator::new(&snapshot);

    let title = nav.column_named("title").unwrap();
    assert_eq!(
        title.first_mismatch(&[Value::from("Alien"), Value::from("Avatar")]).unwrap(),
        None
    );
    let year = nav.next_column().unwrap();
    assert_eq!(year.name(), "Year");
    assert!(nav.next_column().is_err());

    assert_eq!(nav.next_row().unwrap().value(0).unwrap(), &Value::from(1));
}
