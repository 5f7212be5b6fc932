use nexusdb_core::DbDriver;
use std::sync::Mutex;
use std::time::Instant;

/// Pool-owned holder around a single driver instance (spec §3
/// `ConnectionWrapper`). Carries health and idle-time metadata alongside
/// the driver handle itself.
pub struct ConnectionWrapper {
    driver: Box<dyn DbDriver>,
    healthy: Mutex<bool>,
    last_used: Mutex<Instant>,
}

impl ConnectionWrapper {
    pub fn new(driver: Box<dyn DbDriver>) -> Self {
        Self {
            driver,
            healthy: Mutex::new(true),
            last_used: Mutex::new(Instant::now()),
        }
    }

    pub fn driver(&self) -> &dyn DbDriver {
        self.driver.as_ref()
    }

    pub fn is_healthy(&self) -> bool {
        *lock(&self.healthy)
    }

    pub fn mark_unhealthy(&self) {
        *lock(&self.healthy) = false;
    }

    pub fn update_last_used(&self) {
        *lock(&self.last_used) = Instant::now();
    }

    pub fn last_used(&self) -> Instant {
        *lock(&self.last_used)
    }

    pub fn is_idle_timeout_exceeded(&self, timeout: std::time::Duration) -> bool {
        self.last_used().elapsed() >= timeout
    }
}

impl Drop for ConnectionWrapper {
    fn drop(&mut self) {
        self.driver.disconnect();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
