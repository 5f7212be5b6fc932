use nexusdb_core::{DatabaseKind, DbDriver, QueryResult, Row, Value};
use rusqlite::types::ValueRef;
use rusqlite::Connection as RusqliteConnection;
use std::sync::Mutex;
use std::time::Instant;

/// SQLite backend (spec §4.1/§6): connection string is a filesystem path or
/// `:memory:`, passed straight to `rusqlite::Connection::open`.
pub struct SqliteDriver {
    conn: Mutex<Option<RusqliteConnection>>,
}

impl SqliteDriver {
    pub fn new() -> Self {
        Self {
            conn: Mutex::new(None),
        }
    }

    fn with_conn<T>(&self, default: T, f: impl FnOnce(&RusqliteConnection) -> T) -> T {
        match self.conn.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(conn) => f(conn),
                None => {
                    log::error!("sqlite: operation attempted before connect");
                    default
                }
            },
            Err(poisoned) => match poisoned.into_inner().as_ref() {
                Some(conn) => f(conn),
                None => default,
            },
        }
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DbDriver for SqliteDriver {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Sqlite
    }

    fn connect(&self, conn_string: &str) -> bool {
        let mut guard = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            log::warn!("sqlite: connect called while already connected");
            return false;
        }
        match RusqliteConnection::open(conn_string) {
            Ok(conn) => {
                *guard = Some(conn);
                true
            }
            Err(err) => {
                log::error!("sqlite: connect failed: {err}");
                false
            }
        }
    }

    fn disconnect(&self) -> bool {
        let mut guard = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take().is_some()
    }

    fn create_query(&self, query: &str) -> bool {
        self.with_conn(false, |conn| match conn.execute_batch(query) {
            Ok(()) => true,
            Err(err) => {
                log::error!("sqlite: create query failed: {err}");
                false
            }
        })
    }

    fn insert_query(&self, query: &str) -> u32 {
        self.affected(query)
    }

    fn update_query(&self, query: &str) -> u32 {
        self.affected(query)
    }

    fn delete_query(&self, query: &str) -> u32 {
        self.affected(query)
    }

    fn select_query(&self, query: &str) -> QueryResult {
        self.with_conn(QueryResult::empty(), |conn| {
            let start = Instant::now();
            let mut stmt = match conn.prepare(query) {
                Ok(stmt) => stmt,
                Err(err) => {
                    log::error!("sqlite: select failed to prepare: {err}");
                    return QueryResult::empty();
                }
            };
            let column_names: Vec<String> =
                stmt.column_names().iter().map(|s| s.to_string()).collect();

            let rows_result = stmt.query_map([], |row| {
                let mut out = Row::new();
                for (idx, name) in column_names.iter().enumerate() {
                    let _ = out.insert(name, sqlite_value(row, idx));
                }
                Ok(out)
            });

            let rows = match rows_result {
                Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
                Err(err) => {
                    log::error!("sqlite: select failed: {err}");
                    Vec::new()
                }
            };

            let mut result = QueryResult::with_rows(rows);
            result.execution_time = start.elapsed();
            result
        })
    }

    fn execute_query(&self, query: &str) -> bool {
        self.with_conn(false, |conn| match conn.execute_batch(query) {
            Ok(()) => true,
            Err(err) => {
                log::error!("sqlite: execute failed: {err}");
                false
            }
        })
    }
}

impl SqliteDriver {
    fn affected(&self, query: &str) -> u32 {
        self.with_conn(0, |conn| match conn.execute(query, []) {
            Ok(count) => count as u32,
            Err(err) => {
                log::error!("sqlite: mutation failed: {err}");
                0
            }
        })
    }
}

fn sqlite_value(row: &rusqlite::Row, idx: usize) -> Value {
    match row.get_ref(idx) {
        Ok(ValueRef::Null) => Value::Null,
        Ok(ValueRef::Integer(i)) => Value::Int64(i),
        Ok(ValueRef::Real(f)) => Value::Float64(f),
        Ok(ValueRef::Text(t)) => Value::String(String::from_utf8_lossy(t).to_string()),
        Ok(ValueRef::Blob(b)) => Value::Bytes(b.to_vec()),
        Err(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_create_insert_select_round_trips() {
        let driver = SqliteDriver::new();
        assert!(driver.connect(":memory:"));
        assert!(driver.create_query("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)"));
        assert_eq!(driver.insert_query("INSERT INTO users (name) VALUES ('alice')"), 1);

        let result = driver.select_query("SELECT id, name FROM users");
        assert_eq!(result.row_count(), 1);
        assert_eq!(
            result.rows[0].get("name"),
            Some(&Value::String("alice".to_string()))
        );
    }

    #[test]
    fn operations_before_connect_return_safe_defaults() {
        let driver = SqliteDriver::new();
        assert_eq!(driver.insert_query("INSERT INTO x VALUES (1)"), 0);
        assert!(driver.select_query("SELECT 1").is_empty());
    }

    #[test]
    fn reconnect_on_open_handle_is_rejected() {
        let driver = SqliteDriver::new();
        assert!(driver.connect(":memory:"));
        assert!(!driver.connect(":memory:"));
    }
}
