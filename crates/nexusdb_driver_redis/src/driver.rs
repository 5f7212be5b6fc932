use nexusdb_core::{DatabaseKind, DbDriver, QueryResult, Row, Value};
use redis::Connection as RedisConnection;
use std::sync::Mutex;
use std::time::Instant;

const DEFAULT_PORT: u16 = 6379;

/// Redis backend (spec §4.1/§6): connection string is either a full
/// `redis://[pw@]host[:port]/db` URI or a bare `host[:port]`, defaulting to
/// port 6379 and database 0.
///
/// Redis has no schema or multi-key transactions in this model, so the CRUD
/// verbs map onto single commands: `insert_query`/`update_query` take a
/// `key:value` pair and issue `SET`, `delete_query`/`select_query` take a
/// bare key and issue `DEL`/`GET`. `create_query` and `execute_query` both
/// forward their argument as a raw, whitespace-split Redis command.
pub struct RedisDriver {
    conn: Mutex<Option<RedisConnection>>,
}

impl RedisDriver {
    pub fn new() -> Self {
        Self {
            conn: Mutex::new(None),
        }
    }

    fn with_conn<T>(&self, default: T, f: impl FnOnce(&mut RedisConnection) -> T) -> T {
        match self.conn.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(conn) => f(conn),
                None => {
                    log::error!("redis: operation attempted before connect");
                    default
                }
            },
            Err(poisoned) => match poisoned.into_inner().as_mut() {
                Some(conn) => f(conn),
                None => default,
            },
        }
    }
}

impl Default for RedisDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_uri(conn_string: &str) -> String {
    if conn_string.starts_with("redis://") || conn_string.starts_with("rediss://") {
        conn_string.to_string()
    } else {
        format!("redis://{}:{}/0", conn_string, DEFAULT_PORT)
    }
}

impl DbDriver for RedisDriver {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Redis
    }

    fn connect(&self, conn_string: &str) -> bool {
        let mut guard = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            log::warn!("redis: connect called while already connected");
            return false;
        }
        let uri = normalize_uri(conn_string);
        let client = match redis::Client::open(uri) {
            Ok(client) => client,
            Err(err) => {
                log::error!("redis: invalid connection string: {err}");
                return false;
            }
        };
        match client.get_connection() {
            Ok(conn) => {
                *guard = Some(conn);
                true
            }
            Err(err) => {
                log::error!("redis: connect failed: {err}");
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
        self.execute_query(query)
    }

    fn insert_query(&self, query: &str) -> u32 {
        self.set_key_value(query)
    }

    fn update_query(&self, query: &str) -> u32 {
        self.set_key_value(query)
    }

    fn delete_query(&self, query: &str) -> u32 {
        let key = query.trim();
        self.with_conn(0, |conn| match redis::cmd("DEL").arg(key).query::<u32>(conn) {
            Ok(deleted) => deleted,
            Err(err) => {
                log::error!("redis: delete failed: {err}");
                0
            }
        })
    }

    fn select_query(&self, query: &str) -> QueryResult {
        let key = query.trim();
        self.with_conn(QueryResult::empty(), |conn| {
            let start = Instant::now();
            match redis::cmd("GET").arg(key).query::<Option<String>>(conn) {
                Ok(Some(value)) => {
                    let mut row = Row::new();
                    let _ = row.insert("key", Value::String(key.to_string()));
                    let _ = row.insert("value", Value::String(value));
                    let mut result = QueryResult::with_rows(vec![row]);
                    result.execution_time = start.elapsed();
                    result
                }
                Ok(None) => QueryResult::empty(),
                Err(err) => {
                    log::error!("redis: select failed: {err}");
                    QueryResult::empty()
                }
            }
        })
    }

    fn execute_query(&self, query: &str) -> bool {
        let parts: Vec<&str> = query.split_whitespace().collect();
        let Some((verb, args)) = parts.split_first() else {
            log::error!("redis: empty command");
            return false;
        };
        self.with_conn(false, |conn| {
            let mut command = redis::cmd(verb);
            for arg in args {
                command.arg(*arg);
            }
            match command.query::<redis::Value>(conn) {
                Ok(_) => true,
                Err(err) => {
                    log::error!("redis: command failed: {err}");
                    false
                }
            }
        })
    }
}

impl RedisDriver {
    fn set_key_value(&self, query: &str) -> u32 {
        let Some((key, value)) = query.split_once(':') else {
            log::error!("redis: expected `key:value`, got: {query}");
            return 0;
        };
        self.with_conn(0, |conn| {
            match redis::cmd("SET")
                .arg(key.trim())
                .arg(value.trim())
                .query::<()>(conn)
            {
                Ok(()) => 1,
                Err(err) => {
                    log::error!("redis: set failed: {err}");
                    0
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uri_adds_scheme_and_default_port() {
        assert_eq!(normalize_uri("localhost"), "redis://localhost:6379/0");
        assert_eq!(normalize_uri("redis://x:1/2"), "redis://x:1/2");
    }

    #[test]
    fn operations_before_connect_return_safe_defaults() {
        let driver = RedisDriver::new();
        assert_eq!(driver.insert_query("key:value"), 0);
        assert!(driver.select_query("key").is_empty());
        assert!(!driver.disconnect());
    }

    #[test]
    fn malformed_set_query_is_rejected() {
        let driver = RedisDriver::new();
        assert_eq!(driver.insert_query("no-colon-here"), 0);
    }
}
