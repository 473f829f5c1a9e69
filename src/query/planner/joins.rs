// Join Planning
//
// This module decides which relations a query must join and in which order.
// Relations are connected through shared key columns; when the requested
// relations fall into disjoint key spaces a pivot relation is added to
// bridge them.

use std::collections::{BTreeSet, HashMap, HashSet};

use linked_hash_map::LinkedHashMap;
use log::debug;

use super::resolver::split_qualified;
use crate::catalog::Schema;
use crate::query::executor::result::{QueryError, QueryResult};

/// One relation to join and the columns to fetch from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStep {
    pub relation: String,
    pub columns: Vec<String>,
}

impl JoinStep {
    pub fn new(relation: impl Into<String>, columns: Vec<String>) -> Self {
        JoinStep {
            relation: relation.into(),
            columns,
        }
    }
}

/// Relation name to key field names, in schema order
pub type KeyMap = LinkedHashMap<String, Vec<String>>;

/// Build the key map of a schema
pub fn make_keymap(schema: &Schema) -> KeyMap {
    schema
        .relation_names()
        .map(|name| {
            let keys: Vec<String> = schema.keys(name).into_iter().map(String::from).collect();
            (name.to_string(), keys)
        })
        .collect()
}

/// Undirected graph over key names; each relation's keys form a clique
#[derive(Debug, Clone, Default)]
pub struct KeyGraph {
    nodes: BTreeSet<String>,
    edges: HashMap<String, BTreeSet<String>>,
}

impl KeyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the keys of one relation, connecting each pair
    pub fn add_clique(&mut self, keys: &[String]) {
        for (i, key) in keys.iter().enumerate() {
            self.nodes.insert(key.clone());
            for other in &keys[i + 1..] {
                self.edges
                    .entry(key.clone())
                    .or_default()
                    .insert(other.clone());
                self.edges
                    .entry(other.clone())
                    .or_default()
                    .insert(key.clone());
            }
        }
    }

    /// Connected components, ordered by their smallest key name
    pub fn components(&self) -> Vec<BTreeSet<String>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut components = Vec::new();
        for start in &self.nodes {
            if seen.contains(start.as_str()) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut stack = vec![start.as_str()];
            while let Some(node) = stack.pop() {
                if !seen.insert(node) {
                    continue;
                }
                component.insert(node.to_string());
                if let Some(neighbors) = self.edges.get(node) {
                    stack.extend(neighbors.iter().map(String::as_str));
                }
            }
            components.push(component);
        }
        components
    }
}

/// Find relations that connect the key spaces of `relset` into one
///
/// Candidates are tried in schema order; a candidate must have more than one
/// key and touch more than one current component.
pub fn pivot_relations(relset: &[String], keymap: &KeyMap) -> QueryResult<Vec<String>> {
    let mut graph = KeyGraph::new();
    for relation in relset {
        if let Some(keys) = keymap.get(relation) {
            graph.add_clique(keys);
        }
    }

    let mut pivots: Vec<String> = Vec::new();
    let mut components = graph.components();
    while components.len() > 1 {
        let candidate = keymap.iter().find(|(relation, keys)| {
            !relset.contains(relation)
                && !pivots.contains(relation)
                && keys.len() > 1
                && components
                    .iter()
                    .filter(|component| keys.iter().any(|key| component.contains(key)))
                    .count()
                    > 1
        });
        match candidate {
            Some((relation, keys)) => {
                debug!("pivot relation {} bridges keys {:?}", relation, keys);
                graph.add_clique(keys);
                pivots.push(relation.clone());
            }
            None => {
                let mut names: Vec<&str> = relset.iter().map(String::as_str).collect();
                names.sort_unstable();
                return Err(QueryError::NoPivotRelation(names.join(", ")));
            }
        }
        components = graph.components();
    }
    Ok(pivots)
}

/// Plan the joins needed for a resolved projection and condition
///
/// All names in `projection` and `condition_fields` must be qualified.
/// Returns the relations in a valid join order, each with the columns to
/// fetch: the requested columns first, then any of its keys not yet
/// requested.
pub fn plan_joins(
    projection: &[String],
    condition_fields: &[String],
    named: &[String],
    schema: &Schema,
) -> QueryResult<Vec<JoinStep>> {
    let mut relset: Vec<String> = Vec::new();
    for relation in named {
        if relset.contains(relation) {
            return Err(QueryError::DuplicateJoin(relation.clone()));
        }
        schema.fields(relation)?;
        relset.push(relation.clone());
    }

    let mut joinmap: LinkedHashMap<String, Vec<String>> = LinkedHashMap::new();
    let mut added: HashSet<&str> = HashSet::new();
    for qname in projection.iter().chain(condition_fields) {
        if !added.insert(qname.as_str()) {
            continue;
        }
        let (relation, column) = match split_qualified(qname) {
            (Some(relation), column) => (relation, column),
            (None, _) => return Err(QueryError::UndefinedColumn(qname.clone())),
        };
        schema.fields(relation)?;
        if schema.field_index(relation, column).is_none() {
            return Err(QueryError::UndefinedColumn(qname.clone()));
        }
        if !relset.iter().any(|r| r == relation) {
            relset.push(relation.to_string());
        }
        push_column(&mut joinmap, relation, column);
    }

    let keymap = make_keymap(schema);
    relset.extend(pivot_relations(&relset, &keymap)?);

    for relation in &relset {
        if let Some(keys) = keymap.get(relation) {
            for key in keys {
                if !added.contains(format!("{}.{}", relation, key).as_str()) {
                    push_column(&mut joinmap, relation, key);
                }
            }
        }
    }

    let mut joined_keys: HashSet<String> = HashSet::new();
    let mut joins: Vec<JoinStep> = Vec::new();
    while !joinmap.is_empty() {
        let next = joinmap
            .iter()
            .find(|(_, columns)| joins.is_empty() || columns.iter().any(|c| joined_keys.contains(c)))
            .map(|(relation, _)| relation.clone());
        let relation = match next {
            Some(relation) => relation,
            None => {
                let remaining: Vec<&str> = joinmap.keys().map(String::as_str).collect();
                return Err(QueryError::JoinOrderLoop(remaining.join(", ")));
            }
        };
        let columns = joinmap.remove(&relation).unwrap_or_default();
        if let Some(keys) = keymap.get(&relation) {
            joined_keys.extend(keys.iter().cloned());
        }
        joins.push(JoinStep::new(relation, columns));
    }

    debug!(
        "join order: {:?}",
        joins.iter().map(|j| j.relation.as_str()).collect::<Vec<_>>()
    );
    Ok(joins)
}

fn push_column(joinmap: &mut LinkedHashMap<String, Vec<String>>, relation: &str, column: &str) {
    match joinmap.get_mut(relation) {
        Some(columns) => columns.push(column.to_string()),
        None => {
            joinmap.insert(relation.to_string(), vec![column.to_string()]);
        }
    }
}
