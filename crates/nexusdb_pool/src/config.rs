use nexusdb_core::DbError;
use std::time::Duration;

/// Configuration for a single pool (spec §3 `PoolConfig`, defaults per §6).
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_conn: usize,
    pub max_conn: usize,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub health_check_interval: Duration,
    pub health_checks_enabled: bool,
    pub connect_string: String,
}

impl PoolConfig {
    pub fn new(connect_string: impl Into<String>) -> Self {
        Self {
            connect_string: connect_string.into(),
            ..Self::default()
        }
    }

    /// Validates the invariants from spec §3: `0 <= min_conn <= max_conn`
    /// and every timeout is strictly positive.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.min_conn > self.max_conn {
            return Err(DbError::ConfigurationInvalid(format!(
                "min_conn ({}) exceeds max_conn ({})",
                self.min_conn, self.max_conn
            )));
        }
        if self.acquire_timeout.is_zero()
            || self.idle_timeout.is_zero()
            || self.health_check_interval.is_zero()
        {
            return Err(DbError::ConfigurationInvalid(
                "pool timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_conn: 2,
            max_conn: 20,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(30),
            health_check_interval: Duration::from_secs(60),
            health_checks_enabled: true,
            connect_string: String::new(),
        }
    }
}

/// Monotonically-growing counters plus gauges (spec §3 `PoolStats`).
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub total_created: u64,
    pub successful_acquisitions: u64,
    pub failed_acquisitions: u64,
    pub active: usize,
    pub available: usize,
    pub last_health_check: Option<std::time::Instant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_min_above_max() {
        let cfg = PoolConfig {
            min_conn: 5,
            max_conn: 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let cfg = PoolConfig {
            acquire_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn defaults_match_spec() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.min_conn, 2);
        assert_eq!(cfg.max_conn, 20);
        assert_eq!(cfg.acquire_timeout, Duration::from_secs(5));
        assert_eq!(cfg.idle_timeout, Duration::from_secs(30));
        assert_eq!(cfg.health_check_interval, Duration::from_secs(60));
        assert!(cfg.health_checks_enabled);
    }
}
