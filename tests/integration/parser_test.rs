use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tsdbql::query::parser::ast::{ComparisonOp, Condition, Projection, QueryType};
use tsdbql::query::parser::{inspect_query, parse_select, ParseError, Query};
use tsdbql::Value;

fn condition_of(text: &str) -> Result<Condition> {
    inspect_query(text)?
        .condition
        .ok_or_else(|| anyhow!("no condition in {}", text))
}

#[test]
fn test_inspect_query_is_idempotent() -> Result<()> {
    let text = "select i-id i-input from item where i-length < 4 or i-input ~ 'dog'";
    assert_eq!(inspect_query(text)?, inspect_query(text)?);
    Ok(())
}

#[test]
fn test_query_structure() -> Result<()> {
    let query = inspect_query("Select i-input item.i-id from item parse where i-id < 100")?;
    assert_eq!(query.query_type, QueryType::Select);
    assert_eq!(
        query.projection,
        Projection::Columns(vec!["i-input".to_string(), "item.i-id".to_string()])
    );
    assert_eq!(query.relations, vec!["item".to_string(), "parse".to_string()]);
    assert_eq!(
        query.condition,
        Some(Condition::comparison(ComparisonOp::Less, "i-id", 100))
    );
    Ok(())
}

#[test]
fn test_retrieve_is_select() -> Result<()> {
    assert_eq!(
        inspect_query("retrieve i-id from item")?,
        inspect_query("select i-id from item")?
    );
    Ok(())
}

#[test]
fn test_conjunction_binds_tighter() -> Result<()> {
    let flat = condition_of(r#"select i-id where i-id = 10 or i-id = 20 and i-input ~ "[Dd]og""#)?;
    let grouped =
        condition_of(r#"select i-id where i-id = 10 or (i-id = 20 and i-input ~ "[Dd]og")"#)?;
    assert_eq!(flat, grouped);
    assert_eq!(
        flat,
        Condition::or(vec![
            Condition::comparison(ComparisonOp::Equal, "i-id", 10),
            Condition::and(vec![
                Condition::comparison(ComparisonOp::Equal, "i-id", 20),
                Condition::comparison(ComparisonOp::Match, "i-input", "[Dd]og"),
            ]),
        ])
    );
    Ok(())
}

#[test]
fn test_where_clauses_conjoin() -> Result<()> {
    let separate = condition_of("select i-id where i-id > 1 where i-length < 4")?;
    let single = condition_of("select i-id where i-id > 1 and i-length < 4")?;
    assert_eq!(separate, single);
    Ok(())
}

#[test]
fn test_connective_aliases() -> Result<()> {
    let words = condition_of("select i-id where not i-id = 1 and i-id = 2 or i-id = 3")?;
    let symbols = condition_of("select i-id where ! i-id == 1 && i-id == 2 || i-id == 3")?;
    assert_eq!(words, symbols);
    // not scopes over the whole disjunction that follows it
    assert!(matches!(words, Condition::Not(_)));
    Ok(())
}

#[test]
fn test_literal_types() -> Result<()> {
    let cond = condition_of("select i-id where i-date >= 2018-10-07")?;
    let date = NaiveDate::from_ymd_opt(2018, 10, 7)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("bad date"))?;
    assert_eq!(
        cond,
        Condition::comparison(ComparisonOp::GreaterEqual, "i-date", Value::Date(date))
    );

    let cond = condition_of(r"select i-id where i-input == 'it\'s'")?;
    assert_eq!(cond, Condition::comparison(ComparisonOp::Equal, "i-input", "it's"));

    let cond = condition_of("select i-id where i-id != -5")?;
    assert_eq!(cond, Condition::comparison(ComparisonOp::NotEqual, "i-id", -5));

    let cond = condition_of("select i-id where i-date < now")?;
    match cond {
        Condition::Comparison { value: Value::Date(_), .. } => {}
        other => panic!("expected a date literal, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_operator_literal_constraints() {
    // regex needs a string, ordering needs an integer or date
    assert!(inspect_query("select i-id where i-input ~ 3").is_err());
    assert!(inspect_query("select i-id where i-input < 'dog'").is_err());
    assert!(inspect_query("select i-id where i-input = 'dog'").is_ok());
    assert!(inspect_query("select i-id where i-id = 2018-10-07").is_ok());
}

#[test]
fn test_wildcard_requires_from() {
    assert!(matches!(
        inspect_query("select *"),
        Err(ParseError::WildcardWithoutFrom(_))
    ));
    assert!(inspect_query("select * from item").is_ok());
}

#[test]
fn test_unsupported_query_type() {
    assert!(matches!(
        inspect_query("insert into item"),
        Err(ParseError::UnsupportedQuery(kind)) if kind == "insert"
    ));
}

#[test]
fn test_syntax_error_position() {
    let err = match inspect_query("select i-id\nwhere i-id = ") {
        Err(e) => e,
        Ok(q) => panic!("expected a syntax error, got {}", q),
    };
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    assert!(err.to_string().contains("end of input"));

    let err = match parse_select("i-id from item where i-id ? 3") {
        Err(e) => e,
        Ok(q) => panic!("expected a syntax error, got {}", q),
    };
    let message = err.to_string();
    assert!(message.contains("'?'"), "{}", message);
    assert!(message.contains("line 1, column 27"), "{}", message);
}

#[test]
fn test_query_serializes() -> Result<()> {
    let query = inspect_query("select i-id from item where i-id = 10 or i-input ~ 'dog'")?;
    let json = serde_json::to_value(&query)?;
    assert_eq!(json["type"], "select");
    assert_eq!(json["relations"][0], "item");

    let back: Query = serde_json::from_value(json)?;
    assert_eq!(back, query);
    Ok(())
}
