use anyhow::Result;
use tsdbql::query::parser::parse_select;
use tsdbql::query::planner::{ExecutionPlan, JoinStep};
use tsdbql::QueryError;

#[path = "../common/mod.rs"]
mod common;

fn relations(plan: &ExecutionPlan) -> Vec<&str> {
    plan.joins.iter().map(|j| j.relation.as_str()).collect()
}

#[test]
fn test_pivot_relation_bridges_key_spaces() -> Result<()> {
    let schema = common::chain_schema(true)?;
    let plan = ExecutionPlan::new(&parse_select("x y from r1 r3")?, &schema)?;

    assert_eq!(plan.projection, ["r1.x", "r3.y"]);
    assert_eq!(relations(&plan), ["r1", "r2", "r3"]);
    assert_eq!(
        plan.joins[1],
        JoinStep::new("r2", vec!["a".to_string(), "b".to_string()])
    );
    Ok(())
}

#[test]
fn test_missing_pivot_relation() -> Result<()> {
    let schema = common::chain_schema(false)?;
    let err = ExecutionPlan::new(&parse_select("x y from r1 r3")?, &schema).unwrap_err();
    match err {
        QueryError::NoPivotRelation(names) => assert_eq!(names, "r1, r3"),
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}

#[test]
fn test_profile_pivot_through_parse() -> Result<()> {
    let schema = common::profile_schema()?;
    let plan = ExecutionPlan::new(&parse_select("i-input mrs")?, &schema)?;

    assert_eq!(plan.projection, ["item.i-input", "result.mrs"]);
    assert_eq!(relations(&plan), ["item", "parse", "result"]);
    let parse = &plan.joins[1];
    assert_eq!(parse.columns, ["parse-id", "i-id"]);
    Ok(())
}

#[test]
fn test_named_relation_wins_resolution() -> Result<()> {
    let schema = common::profile_schema()?;

    let plan = ExecutionPlan::new(&parse_select("i-id")?, &schema)?;
    assert_eq!(plan.projection, ["item.i-id"]);

    let plan = ExecutionPlan::new(&parse_select("i-id from parse")?, &schema)?;
    assert_eq!(plan.projection, ["parse.i-id"]);
    assert_eq!(relations(&plan), ["parse"]);
    Ok(())
}

#[test]
fn test_wildcard_projection_dedups_keys() -> Result<()> {
    let schema = common::profile_schema()?;
    let plan = ExecutionPlan::new(&parse_select("* from item parse")?, &schema)?;
    assert_eq!(
        plan.projection,
        [
            "item.i-id",
            "item.i-input",
            "item.i-length",
            "item.i-date",
            "parse.parse-id",
            "parse.readings",
            "parse.total",
        ]
    );
    Ok(())
}

#[test]
fn test_condition_columns_are_joined() -> Result<()> {
    let schema = common::profile_schema()?;
    let plan = ExecutionPlan::new(&parse_select("i-id where total > 500")?, &schema)?;
    assert_eq!(relations(&plan), ["item", "parse"]);
    assert_eq!(plan.joins[1].columns, ["total", "parse-id", "i-id"]);
    assert_eq!(
        plan.condition.map(|c| c.to_string()),
        Some("parse.total > 500".to_string())
    );
    Ok(())
}

#[test]
fn test_planning_errors() -> Result<()> {
    let schema = common::profile_schema()?;

    assert!(matches!(
        ExecutionPlan::new(&parse_select("i-id where i-gibberish = 1")?, &schema),
        Err(QueryError::UndefinedColumn(name)) if name == "i-gibberish"
    ));
    assert!(matches!(
        ExecutionPlan::new(&parse_select("i-id from item item")?, &schema),
        Err(QueryError::DuplicateJoin(name)) if name == "item"
    ));
    assert!(matches!(
        ExecutionPlan::new(&parse_select("i-id from fold")?, &schema),
        Err(QueryError::UnknownRelation(name)) if name == "fold"
    ));
    Ok(())
}
