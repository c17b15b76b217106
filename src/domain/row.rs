//! Row and batch representations
//!
//! Rows are column-name to JSON-value maps. A `BTreeMap` keeps column order
//! deterministic, which makes transformation output reproducible and easy to
//! assert on in tests.

use serde_json::Value;
use std::collections::BTreeMap;

/// A single row of data keyed by column name
pub type Row = BTreeMap<String, Value>;

/// A bounded-size chunk of rows processed together
///
/// Batching bounds memory use regardless of table size and enables
/// pipelining between extraction and loading.
pub type RowBatch = Vec<Row>;

/// Builds a row from column name/value pairs
///
/// Convenience for tests and the in-memory adapter.
///
/// # Examples
///
/// ```
/// use trellis::domain::row::row_from_pairs;
/// use serde_json::json;
///
/// let row = row_from_pairs([("id", json!(1)), ("name", json!("alice"))]);
/// assert_eq!(row["name"], json!("alice"));
/// ```
pub fn row_from_pairs<I, K>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_from_pairs() {
        let row = row_from_pairs([("a", json!(1)), ("b", json!(null))]);
        assert_eq!(row.len(), 2);
        assert_eq!(row["a"], json!(1));
        assert!(row["b"].is_null());
    }

    #[test]
    fn test_row_iteration_is_ordered() {
        let row = row_from_pairs([("z", json!(1)), ("a", json!(2))]);
        let keys: Vec<_> = row.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }
}
