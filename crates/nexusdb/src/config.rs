use nexusdb_async::ExecutorConfig;
use nexusdb_monitor::MonitorConfig;
use nexusdb_pool::PoolConfig;
use std::env;
use std::time::Duration;

/// Aggregate configuration for a [`crate::Database`] and the components it
/// wires together, built from `NEXUSDB_*` environment variables with
/// component defaults as the fallback.
#[derive(Debug, Clone)]
pub struct NexusConfig {
    pub pool: PoolConfig,
    pub executor: ExecutorConfig,
    pub monitor: MonitorConfig,
    pub log_sink_capacity: usize,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            executor: ExecutorConfig::default(),
            monitor: MonitorConfig::default(),
            log_sink_capacity: 16_384,
        }
    }
}

impl NexusConfig {
    /// Builds the default configuration, then overlays any recognized
    /// `NEXUSDB_*` environment variables. Unset or unparsable variables
    /// fall back to the default silently (logged at debug level).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_usize("NEXUSDB_POOL_MIN_CONN") {
            config.pool.min_conn = v;
        }
        if let Some(v) = env_usize("NEXUSDB_POOL_MAX_CONN") {
            config.pool.max_conn = v;
        }
        if let Some(v) = env_secs("NEXUSDB_POOL_ACQUIRE_TIMEOUT_SECS") {
            config.pool.acquire_timeout = v;
        }
        if let Some(v) = env_secs("NEXUSDB_POOL_IDLE_TIMEOUT_SECS") {
            config.pool.idle_timeout = v;
        }
        if let Some(v) = env_secs("NEXUSDB_POOL_HEALTH_CHECK_INTERVAL_SECS") {
            config.pool.health_check_interval = v;
        }
        if let Ok(v) = env::var("NEXUSDB_CONNECT_STRING") {
            config.pool.connect_string = v;
        }

        if let Some(v) = env_usize("NEXUSDB_EXECUTOR_WORKER_THREADS") {
            config.executor.worker_threads = v;
        }
        if let Some(v) = env_usize("NEXUSDB_EXECUTOR_QUEUE_CAPACITY") {
            config.executor.queue_capacity = v;
        }

        if let Some(v) = env_secs("NEXUSDB_MONITOR_RETENTION_SECS") {
            config.monitor.retention = v;
        }
        if let Some(v) = env_secs("NEXUSDB_MONITOR_SWEEP_INTERVAL_SECS") {
            config.monitor.sweep_interval = v;
        }

        if let Some(v) = env_usize("NEXUSDB_LOG_SINK_CAPACITY") {
            config.log_sink_capacity = v;
        }

        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                log::debug!("nexusdb: ignoring unparsable {key}={raw}");
                None
            }
        },
        Err(_) => None,
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    env_usize(key).map(|secs| Duration::from_secs(secs as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_component_defaults() {
        let config = NexusConfig::default();
        assert_eq!(config.pool.min_conn, 2);
        assert_eq!(config.log_sink_capacity, 16_384);
    }

    #[test]
    fn unset_env_vars_fall_back_to_defaults() {
        unsafe { env::remove_var("NEXUSDB_POOL_MIN_CONN") };
        let config = NexusConfig::from_env();
        assert_eq!(config.pool.min_conn, 2);
    }
}
