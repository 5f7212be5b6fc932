use crate::pool::ConnectionPool;
use nexusdb_core::DatabaseKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-[`DatabaseKind`] map of pools, independent of whichever driver the
/// facade (C8) currently has active (spec §4.7).
#[derive(Default)]
pub struct PoolRegistry {
    pools: Mutex<HashMap<DatabaseKind, Arc<ConnectionPool>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `pool` for `kind`, shutting down and replacing whatever
    /// pool was previously registered for that kind.
    pub fn register(&self, kind: DatabaseKind, pool: ConnectionPool) -> Arc<ConnectionPool> {
        let pool = Arc::new(pool);
        let previous = self.pools.lock().unwrap().insert(kind, pool.clone());
        if let Some(previous) = previous {
            previous.shutdown();
        }
        pool
    }

    pub fn get(&self, kind: DatabaseKind) -> Option<Arc<ConnectionPool>> {
        self.pools.lock().unwrap().get(&kind).cloned()
    }

    pub fn remove(&self, kind: DatabaseKind) -> Option<Arc<ConnectionPool>> {
        self.pools.lock().unwrap().remove(&kind)
    }

    pub fn shutdown_all(&self) {
        for (_, pool) in self.pools.lock().unwrap().drain() {
            pool.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use nexusdb_core::DbDriver;
    use nexusdb_test_support::FakeDriver;
    use std::sync::Arc as StdArc;

    fn sqlite_factory() -> crate::pool::DriverFactory {
        StdArc::new(|| {
            let driver = FakeDriver::new(DatabaseKind::Sqlite);
            driver
                .connect(":memory:")
                .then_some(Box::new(driver) as Box<dyn DbDriver>)
        })
    }

    #[test]
    fn register_then_get_round_trips() {
        let registry = PoolRegistry::new();
        let pool = ConnectionPool::new(PoolConfig::default(), sqlite_factory()).unwrap();
        registry.register(DatabaseKind::Sqlite, pool);

        assert!(registry.get(DatabaseKind::Sqlite).is_some());
        assert!(registry.get(DatabaseKind::Postgres).is_none());

        registry.shutdown_all();
    }
}
