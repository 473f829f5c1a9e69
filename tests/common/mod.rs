#![allow(dead_code)]

use anyhow::Result;
use tsdbql::{DataType, Field, MemoryDatabase, Schema};

/// Relations of a small test-suite profile
pub const PROFILE_RELATIONS: &str = "\
item:
  i-id :integer :key                    # item id
  i-input :string                       # the test sentence
  i-length :integer                     # number of words
  i-date :date

parse:
  parse-id :integer :key
  i-id :integer :key
  readings :integer
  total :integer                        # total processing time (msec)

result:
  parse-id :integer :key
  result-id :integer
  mrs :string
";

// Build the profile schema from its relations text
pub fn profile_schema() -> Result<Schema> {
    Ok(Schema::from_relations_str(PROFILE_RELATIONS)?)
}

// Profile with five items; item 50 has no parse and item 30 no date
pub fn profile_db() -> Result<MemoryDatabase> {
    let mut db = MemoryDatabase::new(profile_schema()?);

    db.insert_raw("item", &["10", "The dog barks.", "3", "2018-10-07"])?;
    db.insert_raw("item", &["20", "Dogs chase cats.", "3", "2019-01-15"])?;
    db.insert_raw("item", &["30", "It rains.", "2", ""])?;
    db.insert_raw("item", &["40", "Cats sleep soundly.", "3", "2020-05-01"])?;
    db.insert_raw("item", &["50", "Is the dog sleeping?", "4", "2020-05-02"])?;

    db.insert_raw("parse", &["1", "10", "2", "320"])?;
    db.insert_raw("parse", &["2", "20", "1", "780"])?;
    db.insert_raw("parse", &["3", "30", "0", "120"])?;
    db.insert_raw("parse", &["4", "40", "3", "1500"])?;

    db.insert_raw("result", &["1", "0", "[ bark_v_1 ]"])?;
    db.insert_raw("result", &["1", "1", "[ bark_v_1 dog_n_1 ]"])?;
    db.insert_raw("result", &["2", "0", "[ chase_v_1 ]"])?;
    db.insert_raw("result", &["4", "0", "[ sleep_v_1 ]"])?;

    Ok(db)
}

// r1(a) and r3(b) are only connected through r2(a, b)
pub fn chain_schema(with_bridge: bool) -> Result<Schema> {
    let mut schema = Schema::new();
    schema.add_relation(
        "r1",
        vec![Field::key("a", DataType::Integer), Field::column("x", DataType::String)],
    )?;
    if with_bridge {
        schema.add_relation(
            "r2",
            vec![Field::key("a", DataType::Integer), Field::key("b", DataType::Integer)],
        )?;
    }
    schema.add_relation(
        "r3",
        vec![Field::key("b", DataType::Integer), Field::column("y", DataType::String)],
    )?;
    Ok(schema)
}

pub fn chain_db() -> Result<MemoryDatabase> {
    let mut db = MemoryDatabase::new(chain_schema(true)?);
    db.insert_raw("r1", &["1", "one"])?;
    db.insert_raw("r1", &["2", "two"])?;
    db.insert_raw("r2", &["1", "100"])?;
    db.insert_raw("r2", &["2", "200"])?;
    db.insert_raw("r3", &["100", "hundred"])?;
    Ok(db)
}
