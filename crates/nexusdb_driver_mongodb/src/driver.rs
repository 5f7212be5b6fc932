use bson::{Bson, Document};
use mongodb::sync::{Client, Database};
use nexusdb_core::{DatabaseKind, DbDriver, QueryResult, Row, Value};
use std::sync::Mutex;
use std::time::Instant;

/// MongoDB backend (spec §4.1/§6): connection string is a standard
/// `mongodb://[user:pw@]host[:port]/db` URI; the target database is taken
/// from the URI path via `Client::default_database`.
///
/// Query strings follow a `collection:filter_json` convention
/// (`collection:filter_json:update_json` for updates); a bare document
/// result carries both the flattened top-level fields and a `_document`
/// field holding the full JSON, per spec §4.1.
pub struct MongoDriver {
    database: Mutex<Option<Database>>,
}

impl MongoDriver {
    pub fn new() -> Self {
        Self {
            database: Mutex::new(None),
        }
    }

    fn with_db<T>(&self, default: T, f: impl FnOnce(&Database) -> T) -> T {
        match self.database.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(db) => f(db),
                None => {
                    log::error!("mongodb: operation attempted before connect");
                    default
                }
            },
            Err(poisoned) => match poisoned.into_inner().as_ref() {
                Some(db) => f(db),
                None => default,
            },
        }
    }
}

impl Default for MongoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DbDriver for MongoDriver {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MongoDb
    }

    fn connect(&self, conn_string: &str) -> bool {
        let mut guard = match self.database.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            log::warn!("mongodb: connect called while already connected");
            return false;
        }
        let client = match Client::with_uri_str(conn_string) {
            Ok(client) => client,
            Err(err) => {
                log::error!("mongodb: connect failed: {err}");
                return false;
            }
        };
        match client.default_database() {
            Some(db) => {
                *guard = Some(db);
                true
            }
            None => {
                log::error!("mongodb: connection string has no default database path");
                false
            }
        }
    }

    fn disconnect(&self) -> bool {
        let mut guard = match self.database.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take().is_some()
    }

    fn create_query(&self, query: &str) -> bool {
        self.with_db(false, |db| match db.create_collection(query.trim()).run() {
            Ok(()) => true,
            Err(err) => {
                log::error!("mongodb: create collection failed: {err}");
                false
            }
        })
    }

    fn insert_query(&self, query: &str) -> u32 {
        let Some((collection, mut parts)) = parse_query(query) else {
            log::error!("mongodb: insert query malformed: {query}");
            return 0;
        };
        let Some(document_json) = parts.pop() else {
            log::error!("mongodb: insert query missing document: {query}");
            return 0;
        };
        let document = match parse_document(&document_json) {
            Ok(doc) => doc,
            Err(err) => {
                log::error!("mongodb: insert document invalid: {err}");
                return 0;
            }
        };
        self.with_db(0, |db| {
            match db.collection::<Document>(&collection).insert_one(document).run() {
                Ok(_) => 1,
                Err(err) => {
                    log::error!("mongodb: insert failed: {err}");
                    0
                }
            }
        })
    }

    fn update_query(&self, query: &str) -> u32 {
        let Some((collection, parts)) = parse_query(query) else {
            log::error!("mongodb: update query malformed: {query}");
            return 0;
        };
        if parts.len() != 2 {
            log::error!("mongodb: update query requires filter and update documents: {query}");
            return 0;
        }
        let filter = match parse_document(&parts[0]) {
            Ok(doc) => doc,
            Err(err) => {
                log::error!("mongodb: update filter invalid: {err}");
                return 0;
            }
        };
        let update = match parse_document(&parts[1]) {
            Ok(doc) => doc,
            Err(err) => {
                log::error!("mongodb: update document invalid: {err}");
                return 0;
            }
        };
        self.with_db(0, |db| {
            match db
                .collection::<Document>(&collection)
                .update_many(filter, update)
                .run()
            {
                Ok(result) => result.modified_count as u32,
                Err(err) => {
                    log::error!("mongodb: update failed: {err}");
                    0
                }
            }
        })
    }

    fn delete_query(&self, query: &str) -> u32 {
        let Some((collection, mut parts)) = parse_query(query) else {
            log::error!("mongodb: delete query malformed: {query}");
            return 0;
        };
        let Some(filter_json) = parts.pop() else {
            log::error!("mongodb: delete query missing filter: {query}");
            return 0;
        };
        let filter = match parse_document(&filter_json) {
            Ok(doc) => doc,
            Err(err) => {
                log::error!("mongodb: delete filter invalid: {err}");
                return 0;
            }
        };
        self.with_db(0, |db| {
            match db.collection::<Document>(&collection).delete_many(filter).run() {
                Ok(result) => result.deleted_count as u32,
                Err(err) => {
                    log::error!("mongodb: delete failed: {err}");
                    0
                }
            }
        })
    }

    fn select_query(&self, query: &str) -> QueryResult {
        let Some((collection, mut parts)) = parse_query(query) else {
            log::error!("mongodb: select query malformed: {query}");
            return QueryResult::empty();
        };
        let filter = match parts.pop().as_deref().map(parse_document) {
            Some(Ok(doc)) => doc,
            Some(Err(err)) => {
                log::error!("mongodb: select filter invalid: {err}");
                return QueryResult::empty();
            }
            None => Document::new(),
        };
        self.with_db(QueryResult::empty(), |db| {
            let start = Instant::now();
            let cursor = match db.collection::<Document>(&collection).find(filter).run() {
                Ok(cursor) => cursor,
                Err(err) => {
                    log::error!("mongodb: select failed: {err}");
                    return QueryResult::empty();
                }
            };
            let mut rows = Vec::new();
            for doc_result in cursor {
                match doc_result {
                    Ok(doc) => rows.push(document_to_row(&doc)),
                    Err(err) => log::error!("mongodb: cursor read failed: {err}"),
                }
            }
            let mut result = QueryResult::with_rows(rows);
            result.execution_time = start.elapsed();
            result
        })
    }

    fn execute_query(&self, query: &str) -> bool {
        let command = match parse_document(query) {
            Ok(doc) => doc,
            Err(err) => {
                log::error!("mongodb: command invalid: {err}");
                return false;
            }
        };
        self.with_db(false, |db| match db.run_command(command).run() {
            Ok(_) => true,
            Err(err) => {
                log::error!("mongodb: command failed: {err}");
                false
            }
        })
    }
}

/// Splits `collection:json[:json...]` on `:` at the top level, skipping
/// colons nested inside JSON documents so filter/update bodies can contain
/// them freely.
fn parse_query(query: &str) -> Option<(String, Vec<String>)> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let bytes = query.as_bytes();
    for (idx, byte) in bytes.iter().enumerate() {
        match byte {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth -= 1,
            b':' if depth == 0 => {
                segments.push(query[start..idx].to_string());
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(query[start..].to_string());
    if segments.is_empty() {
        return None;
    }
    let collection = segments.remove(0).trim().to_string();
    if collection.is_empty() {
        return None;
    }
    Some((collection, segments))
}

fn parse_document(json: &str) -> Result<Document, String> {
    let value: serde_json::Value =
        serde_json::from_str(json.trim()).map_err(|e| e.to_string())?;
    json_to_bson_doc(&value)
}

fn json_to_bson_doc(value: &serde_json::Value) -> Result<Document, String> {
    match json_to_bson(value)? {
        Bson::Document(doc) => Ok(doc),
        _ => Err("expected a JSON object".to_string()),
    }
}

fn json_to_bson(value: &serde_json::Value) -> Result<Bson, String> {
    match value {
        serde_json::Value::Null => Ok(Bson::Null),
        serde_json::Value::Bool(b) => Ok(Bson::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Bson::Int64(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Bson::Double(f))
            } else {
                Err("invalid number".to_string())
            }
        }
        serde_json::Value::String(s) => {
            if s.len() == 24 && s.chars().all(|c| c.is_ascii_hexdigit()) {
                if let Ok(oid) = bson::oid::ObjectId::parse_str(s) {
                    return Ok(Bson::ObjectId(oid));
                }
            }
            Ok(Bson::String(s.clone()))
        }
        serde_json::Value::Array(arr) => {
            let converted: Result<Vec<Bson>, _> = arr.iter().map(json_to_bson).collect();
            Ok(Bson::Array(converted?))
        }
        serde_json::Value::Object(obj) => {
            if let Some(oid_str) = obj.get("$oid").and_then(|v| v.as_str()) {
                let oid = bson::oid::ObjectId::parse_str(oid_str).map_err(|e| e.to_string())?;
                return Ok(Bson::ObjectId(oid));
            }
            let mut doc = Document::new();
            for (key, value) in obj {
                doc.insert(key.clone(), json_to_bson(value)?);
            }
            Ok(Bson::Document(doc))
        }
    }
}

fn document_to_row(doc: &Document) -> Row {
    let mut row = Row::new();
    let as_json = bson::Bson::Document(doc.clone()).into_relaxed_extjson();
    let _ = row.insert("_document", Value::json_document(&as_json));
    for (key, value) in doc {
        let _ = row.insert(key.clone(), bson_to_value(value));
    }
    row
}

fn bson_to_value(bson: &Bson) -> Value {
    match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Int64(*i as i64),
        Bson::Int64(i) => Value::Int64(*i),
        Bson::Double(f) => Value::Float64(*f),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Binary(bin) => Value::Bytes(bin.bytes.clone()),
        Bson::DateTime(dt) => Value::String(dt.to_string()),
        other => Value::json_document(&other.clone().into_relaxed_extjson()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_splits_on_top_level_colons_only() {
        let (collection, parts) = parse_query(r#"users:{"age":{"$gt":10}}"#).unwrap();
        assert_eq!(collection, "users");
        assert_eq!(parts, vec![r#"{"age":{"$gt":10}}"#.to_string()]);
    }

    #[test]
    fn parse_query_splits_filter_and_update() {
        let (collection, parts) =
            parse_query(r#"users:{"id":1}:{"$set":{"name":"bob"}}"#).unwrap();
        assert_eq!(collection, "users");
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn operations_before_connect_return_safe_defaults() {
        let driver = MongoDriver::new();
        assert_eq!(driver.insert_query(r#"users:{"name":"a"}"#), 0);
        assert!(driver.select_query("users:{}").is_empty());
        assert!(!driver.disconnect());
    }
}
