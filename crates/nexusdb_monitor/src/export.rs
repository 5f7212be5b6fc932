use crate::summary::PerformanceSummary;
use serde_json::json;

/// JSON snapshot with the exact key set from spec §6.
pub fn to_json(summary: &PerformanceSummary) -> String {
    let snapshot = json!({
        "total_queries": summary.total_queries,
        "successful_queries": summary.successful_queries,
        "failed_queries": summary.failed_queries,
        "avg_query_time_us": summary.avg_query_time.as_micros() as u64,
        "queries_per_second": summary.queries_per_second,
        "error_rate": summary.error_rate,
        "total_connections": summary.total_connections,
        "active_connections": summary.active_connections,
        "connection_utilization": summary.connection_utilization,
    });
    snapshot.to_string()
}

/// Prometheus text exposition format (spec §6): one gauge or counter per
/// metric, each preceded by `# HELP` / `# TYPE` lines.
pub fn to_prometheus(summary: &PerformanceSummary) -> String {
    let mut out = String::new();

    out.push_str("# HELP database_queries_total Total number of queries executed.\n");
    out.push_str("# TYPE database_queries_total counter\n");
    out.push_str(&format!("database_queries_total {}\n", summary.total_queries));

    out.push_str("# HELP database_query_duration_microseconds Average query execution time in microseconds.\n");
    out.push_str("# TYPE database_query_duration_microseconds gauge\n");
    out.push_str(&format!(
        "database_query_duration_microseconds {}\n",
        summary.avg_query_time.as_micros()
    ));

    out.push_str("# HELP database_error_rate Fraction of queries that failed.\n");
    out.push_str("# TYPE database_error_rate gauge\n");
    out.push_str(&format!("database_error_rate {}\n", summary.error_rate));

    out.push_str("# HELP database_connections_active Active connections across all pools.\n");
    out.push_str("# TYPE database_connections_active gauge\n");
    out.push_str(&format!(
        "database_connections_active {}\n",
        summary.active_connections
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_export_carries_exact_key_set() {
        let summary = PerformanceSummary {
            total_queries: 10,
            ..PerformanceSummary::default()
        };
        let rendered = to_json(&summary);
        for key in [
            "total_queries",
            "successful_queries",
            "failed_queries",
            "avg_query_time_us",
            "queries_per_second",
            "error_rate",
            "total_connections",
            "active_connections",
            "connection_utilization",
        ] {
            assert!(rendered.contains(key), "missing key {key} in {rendered}");
        }
    }

    #[test]
    fn prometheus_export_has_help_and_type_per_metric() {
        let rendered = to_prometheus(&PerformanceSummary::default());
        for metric in [
            "database_queries_total",
            "database_query_duration_microseconds",
            "database_error_rate",
            "database_connections_active",
        ] {
            assert!(rendered.contains(&format!("# HELP {metric}")));
            assert!(rendered.contains(&format!("# TYPE {metric}")));
        }
    }
}
