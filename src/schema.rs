//! Database schema catalog.
//!
//! Introspects the connected database into a [`SchemaMap`] and renders the
//! compact, question-relevant projection of it that grounds query synthesis.
//!
//! # Filtering
//!
//! A column is kept when the question mentions it or its table. When nothing
//! in the question matches, the first [`FALLBACK_TABLE_LIMIT`] tables with at
//! most [`FALLBACK_COLUMN_LIMIT`] columns each are rendered instead, so the
//! model always receives some grounding and the prompt stays bounded.
//!
//! # Example
//!
//! ```
//! use nl2sql_assistant::schema::{SchemaMap, filter_schema};
//!
//! let mut schema = SchemaMap::default();
//! schema.insert("items", vec!["item_name".into(), "price".into()]);
//! schema.insert("orders", vec!["order_id".into(), "total".into()]);
//!
//! let filtered = filter_schema(&schema, "what is the price of item X");
//! assert_eq!(filtered, "TABLE items: item_name, price");
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::{error::AppResult, executor::DataSource};

/// Maximum number of tables rendered when nothing in the question matched
pub const FALLBACK_TABLE_LIMIT: usize = 10;

/// Maximum number of columns per table rendered in the fallback sample
pub const FALLBACK_COLUMN_LIMIT: usize = 8;

/// Ordered mapping of table name to its column names.
///
/// Iteration follows introspection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaMap {
    pub tables: IndexMap<String, Vec<String>>
}

impl SchemaMap {
    /// Add or replace a table
    pub fn insert(&mut self, table: impl Into<String>, columns: Vec<String>) {
        self.tables.insert(table.into(), columns);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Render every table as a `TABLE name: col, ...` line
    pub fn to_summary(&self) -> String {
        render(self.tables.iter().map(|(t, c)| (t.as_str(), c.as_slice())))
    }
}

/// Introspect the data source into a fresh [`SchemaMap`].
///
/// # Errors
///
/// Propagates any failure of the data source.
pub fn fetch_schema(source: &dyn DataSource) -> AppResult<SchemaMap> {
    let mut schema = SchemaMap::default();
    for table in source.list_tables()? {
        let columns = source.list_columns(&table)?;
        schema.insert(table, columns);
    }
    debug!(tables = schema.len(), "schema fetched");
    Ok(schema)
}

/// Render the part of the schema relevant to a question.
pub fn filter_schema(schema: &SchemaMap, question: &str) -> String {
    let q = question.to_lowercase();
    let tokens = tokenize(&q);
    let mut matches: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (table, columns) in &schema.tables {
        let table_lower = table.to_lowercase();
        let table_hit = q.contains(&table_lower) || token_match(&tokens, &table_lower);
        for column in columns {
            let column_lower = column.to_lowercase();
            if table_hit || q.contains(&column_lower) || token_match(&tokens, &column_lower) {
                matches.entry(table.as_str()).or_default().push(column.as_str());
            }
        }
    }
    if !matches.is_empty() {
        debug!(tables = matches.len(), "schema filtered by question");
        return render(matches.iter().map(|(t, c)| (*t, c.as_slice())));
    }
    debug!("no schema match, using fallback sample");
    render(
        schema
            .tables
            .iter()
            .take(FALLBACK_TABLE_LIMIT)
            .map(|(t, c)| (t.as_str(), &c[..c.len().min(FALLBACK_COLUMN_LIMIT)]))
    )
}

fn render<'a, S, I>(tables: I) -> String
where
    S: AsRef<str> + 'a,
    I: Iterator<Item = (&'a str, &'a [S])>
{
    tables
        .map(|(table, columns)| {
            let cols: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
            format!("TABLE {}: {}", table, cols.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn tokenize(question: &str) -> HashSet<&str> {
    question
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Token-level match tolerating a trailing plural `s` on either side.
fn token_match(tokens: &HashSet<&str>, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if tokens.contains(name) {
        return true;
    }
    if let Some(singular) = name.strip_suffix('s')
        && !singular.is_empty()
        && tokens.contains(singular)
    {
        return true;
    }
    tokens.contains(format!("{}s", name).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        let tokens = tokenize("price of item_name, x?");
        assert!(tokens.contains("price"));
        assert!(tokens.contains("item_name"));
        assert!(tokens.contains("x"));
    }

    #[test]
    fn test_token_match_plural() {
        let tokens = tokenize("price of item x");
        assert!(token_match(&tokens, "items"));
        assert!(!token_match(&tokens, "orders"));
    }

    #[test]
    fn test_token_match_singular_name() {
        let tokens = tokenize("all customers");
        assert!(token_match(&tokens, "customer"));
    }

    #[test]
    fn test_token_match_empty_name() {
        let tokens = tokenize("anything");
        assert!(!token_match(&tokens, ""));
    }
}
