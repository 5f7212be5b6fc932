use nexusdb_core::{QueryResult, Row, Value};

pub fn row(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Row {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub fn result_with_rows(rows: Vec<Row>) -> QueryResult {
    QueryResult::with_rows(rows)
}
