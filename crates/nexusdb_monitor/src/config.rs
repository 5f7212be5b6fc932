use std::time::Duration;

/// Retention, sweep cadence, and alert thresholds for
/// [`crate::PerformanceMonitor`] (spec §4.6).
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub retention: Duration,
    pub sweep_interval: Duration,
    pub slow_query_threshold: Duration,
    pub latency_threshold: Duration,
    pub error_rate_threshold: f64,
    pub pool_utilization_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
            slow_query_threshold: Duration::from_millis(500),
            latency_threshold: Duration::from_secs(1),
            error_rate_threshold: 0.05,
            pool_utilization_threshold: 0.9,
        }
    }
}
