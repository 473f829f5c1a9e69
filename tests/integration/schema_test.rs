use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;
use tsdbql::{select, DataType, MemoryDatabase, QueryError, Schema, Value};

#[path = "../common/mod.rs"]
mod common;

#[test]
fn test_load_relations_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(common::PROFILE_RELATIONS.as_bytes())?;
    file.flush()?;

    let schema = Schema::from_file(file.path())?;
    assert_eq!(schema.relation_names().collect::<Vec<_>>(), ["item", "parse", "result"]);
    assert_eq!(schema.keys("parse"), ["parse-id", "i-id"]);

    let fields = schema.fields("item")?;
    assert_eq!(fields[0].comment(), Some("item id"));
    assert_eq!(fields[3].datatype(), &DataType::Date);
    assert_eq!(schema.field_index("parse", "total"), Some(3));
    Ok(())
}

#[test]
fn test_missing_relations_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("relations");
    assert!(matches!(Schema::from_file(path), Err(QueryError::Schema(_))));
    Ok(())
}

#[test]
fn test_rendered_schema_parses_back() -> Result<()> {
    let schema = common::profile_schema()?;
    let rendered = schema.to_string();
    assert!(rendered.starts_with("item:\n  i-id :integer :key"));
    assert_eq!(rendered.parse::<Schema>()?, schema);
    Ok(())
}

#[test]
fn test_raw_rows_are_cast() -> Result<()> {
    let mut db = MemoryDatabase::new(common::profile_schema()?);
    db.insert_raw("item", &["7", "Abrams barked.", "+2", "7-oct-18"])?;
    db.insert_raw("item", &["8", "", "", ""])?;
    assert!(matches!(
        db.insert_raw("item", &["x", "", "", ""]),
        Err(QueryError::TypeError(_))
    ));
    assert!(matches!(
        db.insert_raw("item", &["9"]),
        Err(QueryError::Schema(_))
    ));

    let rows: Vec<_> = select("i-length i-date where i-id = 7", &db)?.rows().collect();
    assert_eq!(rows[0][0], Value::Integer(2));
    assert_eq!(rows[0][1].to_string(), "2018-10-07");

    let rows: Vec<_> = select("i-input i-length i-date where i-id = 8", &db)?.rows().collect();
    assert_eq!(rows[0], vec![Value::from(""), Value::Null, Value::Null]);
    Ok(())
}
