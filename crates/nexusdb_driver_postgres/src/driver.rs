use nexusdb_core::{DatabaseKind, DbDriver, QueryResult, Row, Value};
use native_tls::TlsConnector;
use postgres::{Client, NoTls};
use postgres_native_tls::MakeTlsConnector;
use std::sync::Mutex;
use std::time::Instant;

/// PostgreSQL backend (spec §4.1/§6): connection string is a libpq
/// key=value string (`host=... port=... user=... password=... dbname=...`),
/// passed straight through to `postgres::Client::connect`.
pub struct PostgresDriver {
    client: Mutex<Option<Client>>,
}

impl PostgresDriver {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    fn with_client<T>(&self, default: T, f: impl FnOnce(&mut Client) -> T) -> T {
        match self.client.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(client) => f(client),
                None => {
                    log::error!("postgres: operation attempted before connect");
                    default
                }
            },
            Err(poisoned) => match poisoned.into_inner().as_mut() {
                Some(client) => f(client),
                None => default,
            },
        }
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn connect(conn_string: &str) -> Result<Client, postgres::Error> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .build()
        .expect("TLS connector configuration is static and infallible");
    let tls = MakeTlsConnector::new(connector);

    match Client::connect(conn_string, tls) {
        Ok(client) => Ok(client),
        Err(_) => Client::connect(conn_string, NoTls),
    }
}

impl DbDriver for PostgresDriver {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }

    fn connect(&self, conn_string: &str) -> bool {
        let mut guard = match self.client.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_some() {
            log::warn!("postgres: connect called while already connected");
            return false;
        }
        match connect(conn_string) {
            Ok(client) => {
                *guard = Some(client);
                true
            }
            Err(err) => {
                log::error!("postgres: connect failed: {err}");
                false
            }
        }
    }

    fn disconnect(&self) -> bool {
        let mut guard = match self.client.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take().is_some()
    }

    fn create_query(&self, query: &str) -> bool {
        self.with_client(false, |client| match client.batch_execute(query) {
            Ok(()) => true,
            Err(err) => {
                log::error!("postgres: create query failed: {err}");
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
        self.with_client(QueryResult::empty(), |client| {
            let start = Instant::now();
            match client.query(query, &[]) {
                Ok(rows) => {
                    let converted = rows.iter().map(postgres_row_to_row).collect();
                    let mut result = QueryResult::with_rows(converted);
                    result.execution_time = start.elapsed();
                    result
                }
                Err(err) => {
                    log::error!("postgres: select failed: {err}");
                    QueryResult::empty()
                }
            }
        })
    }

    fn execute_query(&self, query: &str) -> bool {
        self.with_client(false, |client| match client.batch_execute(query) {
            Ok(()) => true,
            Err(err) => {
                log::error!("postgres: execute failed: {err}");
                false
            }
        })
    }
}

impl PostgresDriver {
    fn affected(&self, query: &str) -> u32 {
        self.with_client(0, |client| match client.execute(query, &[]) {
            Ok(count) => count as u32,
            Err(err) => {
                log::error!("postgres: mutation failed: {err}");
                0
            }
        })
    }
}

fn postgres_row_to_row(row: &postgres::Row) -> Row {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let _ = out.insert(column.name(), postgres_value(row, idx));
    }
    out
}

fn postgres_value(row: &postgres::Row, idx: usize) -> Value {
    let type_name = row.columns()[idx].type_().name();
    match type_name {
        "bool" => row.try_get::<_, bool>(idx).map(Value::Bool).unwrap_or(Value::Null),
        "int2" => row
            .try_get::<_, i16>(idx)
            .map(|v| Value::Int64(v as i64))
            .unwrap_or(Value::Null),
        "int4" => row
            .try_get::<_, i32>(idx)
            .map(|v| Value::Int64(v as i64))
            .unwrap_or(Value::Null),
        "int8" => row.try_get::<_, i64>(idx).map(Value::Int64).unwrap_or(Value::Null),
        "float4" => row
            .try_get::<_, f32>(idx)
            .map(|v| Value::Float64(v as f64))
            .unwrap_or(Value::Null),
        "float8" | "numeric" => row
            .try_get::<_, f64>(idx)
            .map(Value::Float64)
            .unwrap_or(Value::Null),
        "bytea" => row
            .try_get::<_, Vec<u8>>(idx)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<_, String>(idx)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_without_server_logs_and_returns_false() {
        let driver = PostgresDriver::new();
        assert!(!driver.connect("host=127.0.0.1 port=1 user=none dbname=none connect_timeout=1"));
    }

    #[test]
    fn operations_before_connect_return_safe_defaults() {
        let driver = PostgresDriver::new();
        assert_eq!(driver.insert_query("INSERT INTO x VALUES (1)"), 0);
        assert!(driver.select_query("SELECT 1").is_empty());
        assert!(!driver.disconnect());
    }
}
