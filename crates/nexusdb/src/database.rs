use crate::factory::build_driver;
use nexusdb_core::{DatabaseKind, DbDriver, DbError, QueryResult, ShutdownCoordinator, ShutdownPhase};
use nexusdb_logsink::RingBufferSink;
use nexusdb_pool::{ConnectionPool, DriverFactory, PoolConfig, PoolRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Single entry point of the engine (spec §4.7): owns the active driver
/// plus a pool registry that is independent of it. Not a literal global
/// singleton — callers construct their own `Database` freely; only
/// [`crate::default_instance`] wraps one behind process-wide lazy init for
/// callers that want the backward-compatible shared handle.
pub struct Database {
    active: Mutex<Option<Box<dyn DbDriver>>>,
    connected: AtomicBool,
    pools: PoolRegistry,
    log_sink: Mutex<Option<Arc<RingBufferSink>>>,
    shutdown: ShutdownCoordinator,
}

impl Database {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
            connected: AtomicBool::new(false),
            pools: PoolRegistry::new(),
            log_sink: Mutex::new(None),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Attaches the log sink this instance should flush during shutdown's
    /// `FlushingLogs` phase (spec §4.8). Not attached by default, since the
    /// sink is an optional ambient component owned by the caller.
    pub fn attach_log_sink(&self, sink: Arc<RingBufferSink>) {
        *lock(&self.log_sink) = Some(sink);
    }

    pub fn shutdown_phase(&self) -> ShutdownPhase {
        self.shutdown.phase()
    }

    /// Swaps the owned driver via the kind-keyed factory table. Rejected
    /// while a connection is already open.
    pub fn set_mode(&self, kind: DatabaseKind) -> bool {
        if self.connected.load(Ordering::SeqCst) {
            log::warn!("nexusdb: set_mode rejected, a connection is already open");
            return false;
        }
        let Some(driver) = build_driver(kind) else {
            return false;
        };
        *lock(&self.active) = Some(driver);
        true
    }

    pub fn active_kind(&self) -> DatabaseKind {
        lock(&self.active)
            .as_ref()
            .map(|driver| driver.kind())
            .unwrap_or(DatabaseKind::None)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn connect(&self, conn_string: &str) -> bool {
        let guard = lock(&self.active);
        match guard.as_ref() {
            Some(driver) => {
                let ok = driver.connect(conn_string);
                self.connected.store(ok, Ordering::SeqCst);
                ok
            }
            None => {
                log::error!("nexusdb: connect called with no active driver mode set");
                false
            }
        }
    }

    pub fn disconnect(&self) -> bool {
        let guard = lock(&self.active);
        match guard.as_ref() {
            Some(driver) => {
                let ok = driver.disconnect();
                if ok {
                    self.connected.store(false, Ordering::SeqCst);
                }
                ok
            }
            None => false,
        }
    }

    pub fn create_query(&self, query: &str) -> bool {
        self.delegate(false, |driver| driver.create_query(query))
    }

    pub fn insert_query(&self, query: &str) -> u32 {
        self.delegate(0, |driver| driver.insert_query(query))
    }

    pub fn update_query(&self, query: &str) -> u32 {
        self.delegate(0, |driver| driver.update_query(query))
    }

    pub fn delete_query(&self, query: &str) -> u32 {
        self.delegate(0, |driver| driver.delete_query(query))
    }

    pub fn select_query(&self, query: &str) -> QueryResult {
        self.delegate(QueryResult::empty(), |driver| driver.select_query(query))
    }

    pub fn execute_query(&self, query: &str) -> bool {
        self.delegate(false, |driver| driver.execute_query(query))
    }

    /// Registers a pool for `kind`, independent of whichever driver is
    /// currently active (spec §4.7).
    pub fn create_connection_pool(
        &self,
        kind: DatabaseKind,
        config: PoolConfig,
    ) -> Result<Arc<ConnectionPool>, DbError> {
        let connect_string = config.connect_string.clone();
        let factory: DriverFactory = Arc::new(move || {
            let driver = build_driver(kind)?;
            driver.connect(&connect_string).then_some(driver)
        });
        let pool = ConnectionPool::new(config, factory)?;
        Ok(self.pools.register(kind, pool))
    }

    pub fn pool(&self, kind: DatabaseKind) -> Option<Arc<ConnectionPool>> {
        self.pools.get(kind)
    }

    /// Drives graceful shutdown through the documented phases (spec §4.8):
    /// signal, close connections (active driver plus every registered
    /// pool), flush logs, complete. Safe to call more than once; later
    /// calls are no-ops since `request_shutdown` is idempotent.
    pub fn shutdown(&self) {
        if !self.shutdown.request_shutdown() {
            return;
        }

        self.shutdown
            .advance_phase(ShutdownPhase::SignalSent, ShutdownPhase::ClosingConnections);
        self.disconnect();
        self.pools.shutdown_all();

        self.shutdown
            .advance_phase(ShutdownPhase::ClosingConnections, ShutdownPhase::FlushingLogs);
        if let Some(sink) = lock(&self.log_sink).take() {
            sink.shutdown();
        }

        self.shutdown.complete();
    }

    fn delegate<T>(&self, default: T, f: impl FnOnce(&dyn DbDriver) -> T) -> T {
        match lock(&self.active).as_deref() {
            Some(driver) => f(driver),
            None => default,
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_before_set_mode_return_safe_defaults() {
        let db = Database::new();
        assert_eq!(db.insert_query("x"), 0);
        assert!(db.select_query("x").is_empty());
        assert!(!db.connect("anything"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn set_mode_connect_and_query_round_trip() {
        let db = Database::new();
        assert!(db.set_mode(DatabaseKind::Sqlite));
        assert_eq!(db.active_kind(), DatabaseKind::Sqlite);
        assert!(db.connect(":memory:"));
        assert!(db.create_query("CREATE TABLE t (id INTEGER)"));
        assert_eq!(db.insert_query("INSERT INTO t VALUES (1)"), 1);
        assert_eq!(db.select_query("SELECT * FROM t").row_count(), 1);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn set_mode_rejected_while_connected() {
        let db = Database::new();
        assert!(db.set_mode(DatabaseKind::Sqlite));
        assert!(db.connect(":memory:"));
        assert!(!db.set_mode(DatabaseKind::Sqlite));
    }

    #[test]
    fn set_mode_rejects_kind_with_no_driver() {
        let db = Database::new();
        assert!(!db.set_mode(DatabaseKind::Oracle));
        assert!(!db.set_mode(DatabaseKind::None));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn shutdown_closes_connection_and_completes() {
        let db = Database::new();
        assert!(db.set_mode(DatabaseKind::Sqlite));
        assert!(db.connect(":memory:"));
        db.attach_log_sink(Arc::new(nexusdb_logsink::RingBufferSink::new()));

        db.shutdown();

        assert_eq!(db.shutdown_phase(), ShutdownPhase::Complete);
        assert!(!db.is_connected());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let db = Database::new();
        db.shutdown();
        db.shutdown();
        assert_eq!(db.shutdown_phase(), ShutdownPhase::Complete);
    }
}
