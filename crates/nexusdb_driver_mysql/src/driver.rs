use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use nexusdb_core::{parse_kv_pairs, DatabaseKind, DbDriver, QueryResult, Row, Value};
use std::sync::Mutex;
use std::time::Instant;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;

/// MySQL backend (spec §4.1/§6): connection string is a semicolon-delimited
/// `key=value` list (`host`, `port`, `user`, `password`, `database`), parsed
/// with [`parse_kv_pairs`]. `database` and `user` are required; `host` and
/// `port` fall back to `localhost`/`3306`.
pub struct MySqlDriver {
    conn: Mutex<Option<Conn>>,
}

impl MySqlDriver {
    pub fn new() -> Self {
        Self {
            conn: Mutex::new(None),
        }
    }

    fn with_conn<T>(&self, default: T, f: impl FnOnce(&mut Conn) -> T) -> T {
        match self.conn.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(conn) => f(conn),
                None => {
                    log::error!("mysql: operation attempted before connect");
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

impl Default for MySqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn build_opts(conn_string: &str) -> Result<mysql::Opts, String> {
    let fields = parse_kv_pairs(conn_string, ';');
    let database = fields
        .get("database")
        .ok_or_else(|| "connection string missing required `database` key".to_string())?;
    let user = fields
        .get("user")
        .ok_or_else(|| "connection string missing required `user` key".to_string())?;
    let host = fields.get("host").map(String::as_str).unwrap_or(DEFAULT_HOST);
    let port: u16 = fields
        .get("port")
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let mut builder = OptsBuilder::new()
        .ip_or_hostname(Some(host))
        .tcp_port(port)
        .user(Some(user))
        .db_name(Some(database));
    if let Some(password) = fields.get("password") {
        builder = builder.pass(Some(password));
    }
    Ok(builder.into())
}

impl DbDriver for MySqlDriver {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }

    fn connect(&self, conn_string: &str) -> bool {
        let mut guard = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            log::warn!("mysql: connect called while already connected");
            return false;
        }
        let opts = match build_opts(conn_string) {
            Ok(opts) => opts,
            Err(err) => {
                log::error!("mysql: {err}");
                return false;
            }
        };
        match Conn::new(opts) {
            Ok(conn) => {
                *guard = Some(conn);
                true
            }
            Err(err) => {
                log::error!("mysql: connect failed: {err}");
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
        self.with_conn(false, |conn| match conn.query_drop(query) {
            Ok(()) => true,
            Err(err) => {
                log::error!("mysql: create query failed: {err}");
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
            match conn.query_iter(query) {
                Ok(mut result_set) => {
                    let mut rows = Vec::new();
                    for row_result in result_set.by_ref() {
                        match row_result {
                            Ok(mysql_row) => rows.push(mysql_row_to_row(&mysql_row)),
                            Err(err) => {
                                log::error!("mysql: select row decode failed: {err}");
                            }
                        }
                    }
                    let mut result = QueryResult::with_rows(rows);
                    result.execution_time = start.elapsed();
                    result
                }
                Err(err) => {
                    log::error!("mysql: select failed: {err}");
                    QueryResult::empty()
                }
            }
        })
    }

    fn execute_query(&self, query: &str) -> bool {
        self.with_conn(false, |conn| match conn.query_drop(query) {
            Ok(()) => true,
            Err(err) => {
                log::error!("mysql: execute failed: {err}");
                false
            }
        })
    }
}

impl MySqlDriver {
    fn affected(&self, query: &str) -> u32 {
        self.with_conn(0, |conn| match conn.query_drop(query) {
            Ok(()) => conn.affected_rows() as u32,
            Err(err) => {
                log::error!("mysql: mutation failed: {err}");
                0
            }
        })
    }
}

fn mysql_row_to_row(row: &mysql::Row) -> Row {
    let mut out = Row::new();
    let columns = row.columns();
    for (idx, column) in columns.iter().enumerate() {
        let value = row
            .as_ref(idx)
            .map(mysql_value)
            .unwrap_or(Value::Null);
        let _ = out.insert(column.name_str().into_owned(), value);
    }
    out
}

fn mysql_value(value: &mysql::Value) -> Value {
    match value {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::String(text.to_string()),
            Err(_) => Value::Bytes(bytes.clone()),
        },
        mysql::Value::Int(i) => Value::Int64(*i),
        mysql::Value::UInt(u) => {
            if *u <= i64::MAX as u64 {
                Value::Int64(*u as i64)
            } else {
                Value::String(u.to_string())
            }
        }
        mysql::Value::Float(f) => Value::Float64(*f as f64),
        mysql::Value::Double(f) => Value::Float64(*f),
        mysql::Value::Date(year, month, day, hour, min, sec, micro) => Value::String(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            year, month, day, hour, min, sec, micro
        )),
        mysql::Value::Time(neg, days, hours, mins, secs, micros) => Value::String(format!(
            "{}{}:{:02}:{:02}.{:06}",
            if *neg { "-" } else { "" },
            *days as u32 * 24 + *hours as u32,
            mins,
            secs,
            micros
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_keys_are_rejected() {
        assert!(build_opts("host=db1;port=3306").is_err());
        assert!(build_opts("database=app;user=root").is_ok());
    }

    #[test]
    fn operations_before_connect_return_safe_defaults() {
        let driver = MySqlDriver::new();
        assert_eq!(driver.insert_query("INSERT INTO x VALUES (1)"), 0);
        assert!(driver.select_query("SELECT 1").is_empty());
        assert!(!driver.disconnect());
    }

    #[test]
    fn connect_rejects_invalid_connection_string() {
        let driver = MySqlDriver::new();
        assert!(!driver.connect("host=db1;port=3306"));
    }
}
