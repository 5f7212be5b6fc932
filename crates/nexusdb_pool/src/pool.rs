use crate::config::{PoolConfig, PoolStats};
use crate::wrapper::ConnectionWrapper;
use nexusdb_core::{DatabaseKind, DbDriver, DbError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

/// Produces a freshly-connected driver instance, or `None` if the connect
/// attempt failed. Invoked outside any pool lock.
pub type DriverFactory = Arc<dyn Fn() -> Option<Box<dyn DbDriver>> + Send + Sync>;

#[derive(Default)]
struct Shared {
    available: Mutex<VecDeque<Arc<ConnectionWrapper>>>,
    acquire_cv: Condvar,
    active: AtomicUsize,
    stats: Mutex<PoolStats>,
    shutting_down: AtomicBool,
    shutdown_mutex: Mutex<()>,
    shutdown_cv: Condvar,
}

/// Bounded, health-checked, timed acquisition of driver instances (spec
/// §4.2). One pool is registered per [`DatabaseKind`] in a [`crate::PoolRegistry`].
pub struct ConnectionPool {
    config: PoolConfig,
    factory: DriverFactory,
    shared: Arc<Shared>,
    maintenance: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionPool {
    /// Synchronously creates `min_conn` wrappers and spawns the maintenance
    /// thread. Fails if any of the initial connections cannot be created.
    pub fn new(config: PoolConfig, factory: DriverFactory) -> Result<Self, DbError> {
        config.validate()?;

        let shared = Arc::new(Shared::default());
        {
            let mut available = shared.available.lock().unwrap();
            for _ in 0..config.min_conn {
                match factory() {
                    Some(driver) if driver.kind() != DatabaseKind::None => {
                        available.push_back(Arc::new(ConnectionWrapper::new(driver)));
                        shared.stats.lock().unwrap().total_created += 1;
                    }
                    _ => {
                        return Err(DbError::ConnectFailed(
                            "pool initialization failed to reach min_conn".to_string(),
                        ));
                    }
                }
            }
        }

        let maintenance = {
            let shared = shared.clone();
            let config = config.clone();
            std::thread::spawn(move || maintenance_loop(shared, config))
        };

        Ok(Self {
            config,
            factory,
            shared,
            maintenance: Mutex::new(Some(maintenance)),
        })
    }

    /// Acquire protocol of spec §4.2. Blocks the calling thread until a
    /// wrapper is available, the pool is shut down, or `acquire_timeout`
    /// elapses.
    pub fn acquire(&self) -> Result<Arc<ConnectionWrapper>, DbError> {
        if self.shared.shutting_down.load(Ordering::SeqCst) {
            return Err(DbError::PoolShutdown);
        }

        let deadline = Instant::now() + self.config.acquire_timeout;
        let mut available = self.shared.available.lock().unwrap();

        loop {
            if let Some(wrapper) = available.pop_front() {
                wrapper.update_last_used();
                self.shared.active.fetch_add(1, Ordering::SeqCst);
                self.shared.stats.lock().unwrap().successful_acquisitions += 1;
                return Ok(wrapper);
            }

            let active = self.shared.active.load(Ordering::SeqCst);
            if active + available.len() < self.config.max_conn {
                drop(available);
                match (self.factory)() {
                    Some(driver) if driver.kind() != DatabaseKind::None => {
                        let wrapper = Arc::new(ConnectionWrapper::new(driver));
                        self.shared.active.fetch_add(1, Ordering::SeqCst);
                        let mut stats = self.shared.stats.lock().unwrap();
                        stats.total_created += 1;
                        stats.successful_acquisitions += 1;
                        return Ok(wrapper);
                    }
                    _ => {
                        self.shared.stats.lock().unwrap().failed_acquisitions += 1;
                        return Err(DbError::ConnectFailed(
                            "driver factory failed to connect".to_string(),
                        ));
                    }
                }
            }

            if self.shared.shutting_down.load(Ordering::SeqCst) {
                return Err(DbError::PoolShutdown);
            }

            let now = Instant::now();
            if now >= deadline {
                self.shared.stats.lock().unwrap().failed_acquisitions += 1;
                return Err(DbError::PoolExhausted);
            }

            let (guard, _timeout) = self
                .shared
                .acquire_cv
                .wait_timeout(available, deadline - now)
                .unwrap();
            available = guard;
        }
    }

    /// Release protocol of spec §4.2. Drops (does not recycle) unhealthy
    /// wrappers or wrappers returned after shutdown.
    pub fn release(&self, wrapper: Arc<ConnectionWrapper>) {
        self.shared.active.fetch_sub(1, Ordering::SeqCst);

        if self.shared.shutting_down.load(Ordering::SeqCst) {
            return;
        }

        let healthy = wrapper.is_healthy() && wrapper.driver().kind() != DatabaseKind::None;
        if !healthy {
            wrapper.mark_unhealthy();
            log::warn!("dropping unhealthy connection on release");
            return;
        }

        self.shared.available.lock().unwrap().push_back(wrapper);
        self.shared.acquire_cv.notify_one();
    }

    pub fn active_connections(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn available_connections(&self) -> usize {
        self.shared.available.lock().unwrap().len()
    }

    pub fn get_stats(&self) -> PoolStats {
        let mut stats = self.shared.stats.lock().unwrap().clone();
        stats.active = self.active_connections();
        stats.available = self.available_connections();
        stats
    }

    /// Signals termination, wakes every waiter, joins the maintenance
    /// thread, then drops every idle wrapper (closing its driver).
    pub fn shutdown(&self) {
        self.shared.shutting_down.store(true, Ordering::SeqCst);
        self.shared.acquire_cv.notify_all();
        self.shared.shutdown_cv.notify_all();

        if let Some(handle) = self.maintenance.lock().unwrap().take() {
            let _ = handle.join();
        }

        self.shared.available.lock().unwrap().clear();
    }
}

fn maintenance_loop(shared: Arc<Shared>, config: PoolConfig) {
    loop {
        let guard = shared.shutdown_mutex.lock().unwrap();
        let (_guard, _timeout) = shared
            .shutdown_cv
            .wait_timeout(guard, config.health_check_interval)
            .unwrap();

        if shared.shutting_down.load(Ordering::SeqCst) {
            return;
        }

        let mut available = shared.available.lock().unwrap();

        if config.health_checks_enabled {
            available.retain(|w| w.is_healthy() && w.driver().kind() != DatabaseKind::None);
        }

        while available.len() > config.min_conn {
            let stale_index = available
                .iter()
                .position(|w| w.is_idle_timeout_exceeded(config.idle_timeout));
            match stale_index {
                Some(index) => {
                    available.remove(index);
                }
                None => break,
            }
        }

        let available_len = available.len();
        drop(available);

        let mut stats = shared.stats.lock().unwrap();
        stats.last_health_check = Some(Instant::now());
        stats.available = available_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexusdb_test_support::FakeDriver;
    use std::time::Duration;

    fn sqlite_factory() -> DriverFactory {
        Arc::new(|| {
            let driver = FakeDriver::new(DatabaseKind::Sqlite);
            driver.connect(":memory:").then_some(Box::new(driver) as Box<dyn DbDriver>)
        })
    }

    #[test]
    fn initializes_min_conn_wrappers() {
        let config = PoolConfig {
            min_conn: 2,
            max_conn: 4,
            ..Default::default()
        };
        let pool = ConnectionPool::new(config, sqlite_factory()).unwrap();
        assert_eq!(pool.available_connections(), 2);
        pool.shutdown();
    }

    #[test]
    fn acquire_then_release_round_trips() {
        let config = PoolConfig {
            min_conn: 1,
            max_conn: 2,
            ..Default::default()
        };
        let pool = ConnectionPool::new(config, sqlite_factory()).unwrap();

        let wrapper = pool.acquire().unwrap();
        assert_eq!(pool.active_connections(), 1);
        assert_eq!(pool.available_connections(), 0);

        pool.release(wrapper);
        assert_eq!(pool.active_connections(), 0);
        assert_eq!(pool.available_connections(), 1);

        pool.shutdown();
    }

    #[test]
    fn acquire_times_out_when_exhausted() {
        let config = PoolConfig {
            min_conn: 0,
            max_conn: 1,
            acquire_timeout: Duration::from_millis(80),
            ..Default::default()
        };
        let pool = ConnectionPool::new(config, sqlite_factory()).unwrap();

        let _held = pool.acquire().unwrap();
        let start = Instant::now();
        let second = pool.acquire();
        assert!(matches!(second, Err(DbError::PoolExhausted)));
        assert!(start.elapsed() >= Duration::from_millis(60));
        assert_eq!(pool.get_stats().failed_acquisitions, 1);

        pool.shutdown();
    }

    #[test]
    fn shutdown_leaves_zero_outstanding_wrappers() {
        let config = PoolConfig {
            min_conn: 3,
            max_conn: 3,
            ..Default::default()
        };
        let pool = ConnectionPool::new(config, sqlite_factory()).unwrap();
        pool.shutdown();
        assert_eq!(pool.available_connections(), 0);
        assert!(matches!(pool.acquire(), Err(DbError::PoolShutdown)));
    }
}
