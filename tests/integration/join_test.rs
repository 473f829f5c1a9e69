use anyhow::Result;
use tsdbql::query::executor::join::{join, JoinMode};
use tsdbql::{Database, QueryError, Selection, Value};

#[path = "../common/mod.rs"]
mod common;

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_first_join_loads_requested_rows() -> Result<()> {
    let db = common::profile_db()?;
    let mut selection = Selection::new();
    join(&mut selection, &db, "item", &names(&["i-input", "i-id"]), JoinMode::Inner)?;

    assert_eq!(selection.len(), 5);
    let direct: Vec<_> = db.select_from("item", &names(&["i-input", "i-id"]))?.collect();
    let joined: Vec<_> = selection.rows().collect();
    assert_eq!(joined, direct);
    Ok(())
}

#[test]
fn test_inner_join_drops_unmatched() -> Result<()> {
    let db = common::profile_db()?;
    let mut selection = Selection::new();
    join(&mut selection, &db, "item", &names(&["i-id"]), JoinMode::Inner)?;
    join(&mut selection, &db, "parse", &names(&["parse-id", "i-id"]), JoinMode::Inner)?;
    join(&mut selection, &db, "result", &names(&["parse-id", "mrs"]), JoinMode::Inner)?;

    let rows: Vec<_> = selection.select(&["i-id", "result.mrs"])?.collect();
    assert_eq!(
        rows,
        vec![
            vec![Value::Integer(10), Value::from("[ bark_v_1 ]")],
            vec![Value::Integer(10), Value::from("[ bark_v_1 dog_n_1 ]")],
            vec![Value::Integer(20), Value::from("[ chase_v_1 ]")],
            vec![Value::Integer(40), Value::from("[ sleep_v_1 ]")],
        ]
    );
    // shared keys are reachable under every joined relation
    assert_eq!(selection.index_of("result.parse-id"), selection.index_of("parse.parse-id"));
    assert_eq!(selection.index_of("parse.i-id"), selection.index_of("item.i-id"));
    Ok(())
}

#[test]
fn test_left_join_keeps_unmatched() -> Result<()> {
    let db = common::profile_db()?;
    let mut selection = Selection::new();
    join(&mut selection, &db, "item", &names(&["i-id"]), JoinMode::Left)?;
    join(&mut selection, &db, "parse", &names(&["i-id", "total"]), JoinMode::Left)?;

    assert_eq!(selection.len(), 5);
    let unparsed: Vec<_> = selection
        .rows()
        .filter(|row| row[1].is_null())
        .collect();
    assert_eq!(unparsed, vec![vec![Value::Integer(50), Value::Null]]);
    Ok(())
}

#[test]
fn test_join_errors() -> Result<()> {
    let db = common::profile_db()?;
    let mut selection = Selection::new();
    join(&mut selection, &db, "item", &names(&["i-id"]), JoinMode::Inner)?;

    assert!(matches!(
        join(&mut selection, &db, "item", &names(&["i-input"]), JoinMode::Inner),
        Err(QueryError::DuplicateJoin(_))
    ));
    // result only shares parse-id, which is not in the selection yet
    assert!(matches!(
        join(&mut selection, &db, "result", &names(&["parse-id", "mrs"]), JoinMode::Inner),
        Err(QueryError::NoSharedKeys(name)) if name == "result"
    ));
    assert!(matches!(
        "outer".parse::<JoinMode>(),
        Err(QueryError::InvalidJoinMode(_))
    ));
    Ok(())
}
