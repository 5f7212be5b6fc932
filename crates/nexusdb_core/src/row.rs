use crate::Value;
use indexmap::IndexMap;
use std::time::Duration;

/// Ordered mapping from column/field name to [`Value`].
///
/// Insertion order is preserved for iteration; a duplicate key is rejected
/// by [`Row::insert`] rather than silently overwriting, per spec §3 (`Row`
/// "duplicate keys are disallowed").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self {
            columns: IndexMap::new(),
        }
    }

    /// Insert a column value. Returns `false` without modifying the row if
    /// `name` is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return false;
        }
        self.columns.insert(name, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

/// Finite ordered sequence of [`Row`]. An empty result is distinct from a
/// query failure — callers receive `QueryResult { rows: vec![], .. }`, never
/// an error, for a successful query that matched no rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub affected_rows: Option<u64>,
    pub execution_time: Duration,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            affected_rows: None,
            execution_time: Duration::ZERO,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_rejected() {
        let mut row = Row::new();
        assert!(row.insert("id", Value::Int64(1)));
        assert!(!row.insert("id", Value::Int64(2)));
        assert_eq!(row.get("id"), Some(&Value::Int64(1)));
    }

    #[test]
    fn preserves_insertion_order() {
        let mut row = Row::new();
        row.insert("b", Value::Int64(2));
        row.insert("a", Value::Int64(1));
        let names: Vec<_> = row.column_names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn empty_result_distinct_from_no_rows_returned() {
        let result = QueryResult::with_rows(vec![]);
        assert!(result.is_empty());
        assert_eq!(result.row_count(), 0);
    }
}
