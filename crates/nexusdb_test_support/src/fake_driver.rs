use nexusdb_core::{DatabaseKind, DbDriver, QueryResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory [`DbDriver`] used by every crate's test suite instead of a
/// real backend. Records every query string it sees and lets a test
/// program canned responses ahead of time.
#[derive(Clone)]
pub struct FakeDriver {
    kind: DatabaseKind,
    state: Arc<FakeDriverState>,
}

#[derive(Default)]
struct FakeDriverState {
    connected: AtomicBool,
    fail_connect: AtomicBool,
    executed: Mutex<Vec<String>>,
    select_results: Mutex<HashMap<String, QueryResult>>,
    default_select: Mutex<Option<QueryResult>>,
    affected_rows: Mutex<HashMap<String, u32>>,
    failing_queries: Mutex<HashSet<String>>,
}

impl FakeDriver {
    pub fn new(kind: DatabaseKind) -> Self {
        Self {
            kind,
            state: Arc::new(FakeDriverState::default()),
        }
    }

    pub fn fail_connect(self) -> Self {
        self.state.fail_connect.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_select_result(self, query: impl Into<String>, result: QueryResult) -> Self {
        mutex_lock(&self.state.select_results).insert(query.into(), result);
        self
    }

    pub fn with_default_select(self, result: QueryResult) -> Self {
        *mutex_lock(&self.state.default_select) = Some(result);
        self
    }

    pub fn with_affected_rows(self, query: impl Into<String>, count: u32) -> Self {
        mutex_lock(&self.state.affected_rows).insert(query.into(), count);
        self
    }

    pub fn fail_query(self, query: impl Into<String>) -> Self {
        mutex_lock(&self.state.failing_queries).insert(query.into());
        self
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    pub fn executed_queries(&self) -> Vec<String> {
        mutex_lock(&self.state.executed).clone()
    }

    fn record(&self, query: &str) {
        mutex_lock(&self.state.executed).push(query.to_string());
    }

    fn should_fail(&self, query: &str) -> bool {
        mutex_lock(&self.state.failing_queries).contains(query)
    }

    fn affected(&self, query: &str) -> u32 {
        self.record(query);
        if self.should_fail(query) {
            log::error!("fake driver: query rejected: {query}");
            return 0;
        }
        mutex_lock(&self.state.affected_rows)
            .get(query)
            .copied()
            .unwrap_or(1)
    }
}

impl DbDriver for FakeDriver {
    fn kind(&self) -> DatabaseKind {
        self.kind
    }

    fn connect(&self, conn_string: &str) -> bool {
        if self.state.connected.load(Ordering::SeqCst) {
            return false;
        }
        if self.state.fail_connect.load(Ordering::SeqCst) {
            log::error!("fake driver: connect failed for {conn_string}");
            return false;
        }
        self.state.connected.store(true, Ordering::SeqCst);
        true
    }

    fn disconnect(&self) -> bool {
        self.state.connected.swap(false, Ordering::SeqCst)
    }

    fn create_query(&self, query: &str) -> bool {
        self.record(query);
        !self.should_fail(query)
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
        self.record(query);
        if self.should_fail(query) {
            return QueryResult::empty();
        }
        mutex_lock(&self.state.select_results)
            .get(query)
            .cloned()
            .or_else(|| mutex_lock(&self.state.default_select).clone())
            .unwrap_or_else(QueryResult::empty)
    }

    fn execute_query(&self, query: &str) -> bool {
        self.record(query);
        !self.should_fail(query)
    }
}

fn mutex_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexusdb_core::{Row, Value};

    #[test]
    fn connect_then_reconnect_is_rejected() {
        let driver = FakeDriver::new(DatabaseKind::Sqlite);
        assert!(driver.connect(":memory:"));
        assert!(!driver.connect(":memory:"));
    }

    #[test]
    fn select_returns_programmed_result() {
        let mut row = Row::new();
        row.insert("id", Value::Int64(1));
        let driver = FakeDriver::new(DatabaseKind::Postgres)
            .with_select_result("SELECT 1", QueryResult::with_rows(vec![row]));

        let result = driver.select_query("SELECT 1");
        assert_eq!(result.row_count(), 1);
        assert_eq!(driver.executed_queries(), vec!["SELECT 1"]);
    }

    #[test]
    fn failing_query_yields_safe_defaults() {
        let driver = FakeDriver::new(DatabaseKind::MySql).fail_query("DELETE FROM x");
        assert_eq!(driver.delete_query("DELETE FROM x"), 0);
        assert!(driver.select_query("DELETE FROM x").is_empty());
    }
}
