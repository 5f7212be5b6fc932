use std::time::Instant;

/// Alert kinds fanned out to registered handlers (spec §3 `PerformanceAlert`,
/// §4.6 alert rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    SlowQuery,
    HighErrorRate,
    PoolExhaustion,
    HighLatency,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::SlowQuery => "slow_query",
            AlertKind::HighErrorRate => "high_error_rate",
            AlertKind::PoolExhaustion => "pool_exhaustion",
            AlertKind::HighLatency => "high_latency",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PerformanceAlert {
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: Instant,
}
