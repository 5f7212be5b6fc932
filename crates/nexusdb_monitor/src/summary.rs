use std::collections::HashMap;
use std::time::Duration;

/// On-demand aggregation over the current retention window (spec §4.6).
#[derive(Debug, Clone, Default)]
pub struct PerformanceSummary {
    pub total_queries: u64,
    pub successful_queries: u64,
    pub failed_queries: u64,
    pub min_query_time: Duration,
    pub avg_query_time: Duration,
    pub max_query_time: Duration,
    pub queries_per_second: f64,
    pub total_connections: usize,
    pub active_connections: usize,
    pub connection_utilization: f64,
    pub error_rate: f64,
    pub error_counts: HashMap<String, u64>,
}
