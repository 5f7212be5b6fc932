use crate::alert::{AlertKind, PerformanceAlert};
use crate::config::MonitorConfig;
use crate::metric::{ConnectionMetrics, QueryMetric};
use crate::summary::PerformanceSummary;
use nexusdb_core::DatabaseKind;
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

type AlertHandler = Arc<dyn Fn(&PerformanceAlert) + Send + Sync>;

struct Shared {
    config: MonitorConfig,
    queries: Mutex<VecDeque<QueryMetric>>,
    connection_metrics: Mutex<HashMap<DatabaseKind, ConnectionMetrics>>,
    alerts: Mutex<VecDeque<PerformanceAlert>>,
    handlers: Mutex<Vec<AlertHandler>>,
    stop: Mutex<bool>,
    stop_cv: Condvar,
}

/// Singleton-style metrics sink (spec §4.6): ingests query and connection
/// metrics, runs alert rules inline on ingestion, and purges entries past
/// the retention window on a dedicated sweeper thread.
pub struct PerformanceMonitor {
    shared: Arc<Shared>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        let shared = Arc::new(Shared {
            config,
            queries: Mutex::new(VecDeque::new()),
            connection_metrics: Mutex::new(HashMap::new()),
            alerts: Mutex::new(VecDeque::new()),
            handlers: Mutex::new(Vec::new()),
            stop: Mutex::new(false),
            stop_cv: Condvar::new(),
        });

        let sweep_shared = shared.clone();
        let sweeper = std::thread::spawn(move || sweep_loop(sweep_shared));

        Self {
            shared,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    pub fn register_alert_handler(&self, handler: AlertHandler) {
        self.shared.handlers.lock().unwrap().push(handler);
    }

    /// Records a query observation and evaluates the slow-query,
    /// high-error-rate, and high-latency alert rules against it.
    pub fn record_query_metric(&self, metric: QueryMetric) {
        let execution_time = metric.execution_time;
        self.shared.queries.lock().unwrap().push_back(metric);

        if execution_time >= self.shared.config.slow_query_threshold {
            self.emit_alert(
                AlertKind::SlowQuery,
                format!("query exceeded slow-query threshold: {execution_time:?}"),
            );
        }
        if execution_time >= self.shared.config.latency_threshold {
            self.emit_alert(
                AlertKind::HighLatency,
                format!("query exceeded latency threshold: {execution_time:?}"),
            );
        }

        let summary = self.get_performance_summary();
        if summary.total_queries > 0 && summary.error_rate > self.shared.config.error_rate_threshold {
            self.emit_alert(
                AlertKind::HighErrorRate,
                format!("error rate {:.4} exceeds threshold", summary.error_rate),
            );
        }
    }

    /// Records a pool utilization sample for `kind`; emits `pool_exhaustion`
    /// when active/total exceeds the configured threshold.
    pub fn update_connection_count(&self, kind: DatabaseKind, active: usize, total: usize) {
        let metrics = ConnectionMetrics {
            total_connections: total,
            active_connections: active,
            idle_connections: total.saturating_sub(active),
            failed_connections: 0,
            last_update: Some(Instant::now()),
        };
        self.shared
            .connection_metrics
            .lock()
            .unwrap()
            .insert(kind, metrics);

        if total > 0 {
            let utilization = active as f64 / total as f64;
            if utilization > self.shared.config.pool_utilization_threshold {
                self.emit_alert(
                    AlertKind::PoolExhaustion,
                    format!("{kind} pool utilization {utilization:.2} exceeds threshold"),
                );
            }
        }
    }

    pub fn get_connection_metrics(&self, kind: DatabaseKind) -> ConnectionMetrics {
        self.shared
            .connection_metrics
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_performance_summary(&self) -> PerformanceSummary {
        self.summarize(|_| true)
    }

    pub fn get_performance_summary_for(&self, kind: DatabaseKind) -> PerformanceSummary {
        self.summarize(move |metric| metric.backend_kind == kind)
    }

    pub fn get_recent_queries(&self, window: Duration) -> Vec<QueryMetric> {
        let cutoff = Instant::now().checked_sub(window);
        self.shared
            .queries
            .lock()
            .unwrap()
            .iter()
            .filter(|metric| cutoff.is_none_or(|cutoff| metric.end_time >= cutoff))
            .cloned()
            .collect()
    }

    pub fn get_slow_queries(&self, threshold: Duration) -> Vec<QueryMetric> {
        self.shared
            .queries
            .lock()
            .unwrap()
            .iter()
            .filter(|metric| metric.execution_time >= threshold)
            .cloned()
            .collect()
    }

    pub fn get_recent_alerts(&self, window: Duration) -> Vec<PerformanceAlert> {
        let cutoff = Instant::now().checked_sub(window);
        self.shared
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|alert| cutoff.is_none_or(|cutoff| alert.timestamp >= cutoff))
            .cloned()
            .collect()
    }

    pub fn clear_metrics(&self) {
        self.shared.queries.lock().unwrap().clear();
        self.shared.alerts.lock().unwrap().clear();
        self.shared.connection_metrics.lock().unwrap().clear();
    }

    pub fn export_json(&self) -> String {
        crate::export::to_json(&self.get_performance_summary())
    }

    pub fn export_prometheus(&self) -> String {
        crate::export::to_prometheus(&self.get_performance_summary())
    }

    pub fn shutdown(&self) {
        *self.shared.stop.lock().unwrap() = true;
        self.shared.stop_cv.notify_all();
        if let Some(handle) = self.sweeper.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn emit_alert(&self, kind: AlertKind, message: String) {
        let alert = PerformanceAlert {
            kind,
            message,
            timestamp: Instant::now(),
        };
        self.shared.alerts.lock().unwrap().push_back(alert.clone());

        let handlers = self.shared.handlers.lock().unwrap().clone();
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(&alert))).is_err() {
                log::error!("alert handler panicked for {}", alert.kind.label());
            }
        }
    }

    fn summarize(&self, filter: impl Fn(&QueryMetric) -> bool) -> PerformanceSummary {
        let queries = self.shared.queries.lock().unwrap();
        let mut summary = PerformanceSummary::default();
        let mut total_time = Duration::ZERO;
        let mut min_time: Option<Duration> = None;
        let mut max_time = Duration::ZERO;
        let mut earliest: Option<Instant> = None;
        let mut latest: Option<Instant> = None;

        for metric in queries.iter().filter(|metric| filter(metric)) {
            summary.total_queries += 1;
            if metric.success {
                summary.successful_queries += 1;
            } else {
                summary.failed_queries += 1;
                let key = metric
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string());
                *summary.error_counts.entry(key).or_insert(0) += 1;
            }
            total_time += metric.execution_time;
            min_time = Some(min_time.map_or(metric.execution_time, |m| m.min(metric.execution_time)));
            max_time = max_time.max(metric.execution_time);
            earliest = Some(earliest.map_or(metric.start_time, |e: Instant| e.min(metric.start_time)));
            latest = Some(latest.map_or(metric.end_time, |l: Instant| l.max(metric.end_time)));
        }
        drop(queries);

        if summary.total_queries > 0 {
            summary.avg_query_time = total_time / summary.total_queries as u32;
            summary.min_query_time = min_time.unwrap_or_default();
            summary.max_query_time = max_time;
            summary.error_rate = summary.failed_queries as f64 / summary.total_queries as f64;

            let window_seconds = match (earliest, latest) {
                (Some(e), Some(l)) => l.saturating_duration_since(e).as_secs_f64().max(1.0),
                _ => 1.0,
            };
            summary.queries_per_second = summary.total_queries as f64 / window_seconds;
        }

        let connection_metrics = self.shared.connection_metrics.lock().unwrap();
        for metrics in connection_metrics.values() {
            summary.total_connections += metrics.total_connections;
            summary.active_connections += metrics.active_connections;
        }
        if summary.total_connections > 0 {
            summary.connection_utilization =
                summary.active_connections as f64 / summary.total_connections as f64;
        }

        summary
    }
}

fn sweep_loop(shared: Arc<Shared>) {
    let mut guard = shared.stop.lock().unwrap();
    loop {
        let (next_guard, timed_out) = shared
            .stop_cv
            .wait_timeout(guard, shared.config.sweep_interval)
            .unwrap();
        guard = next_guard;
        if *guard {
            return;
        }
        if timed_out.timed_out() {
            purge_expired(&shared);
        }
    }
}

fn purge_expired(shared: &Shared) {
    let cutoff = Instant::now().checked_sub(shared.config.retention);
    let Some(cutoff) = cutoff else { return };
    shared
        .queries
        .lock()
        .unwrap()
        .retain(|metric| metric.end_time >= cutoff);
    shared
        .alerts
        .lock()
        .unwrap()
        .retain(|alert| alert.timestamp >= cutoff);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn metric(success: bool, execution_time: Duration) -> QueryMetric {
        let start = Instant::now();
        QueryMetric::new(
            "SELECT 1",
            DatabaseKind::Postgres,
            start,
            start + execution_time,
            1,
            success,
            if success { None } else { Some("boom".to_string()) },
        )
    }

    #[test]
    fn summary_aggregates_success_and_failure_counts() {
        let monitor = PerformanceMonitor::new(MonitorConfig::default());
        monitor.record_query_metric(metric(true, Duration::from_millis(10)));
        monitor.record_query_metric(metric(false, Duration::from_millis(20)));

        let summary = monitor.get_performance_summary();
        assert_eq!(summary.total_queries, 2);
        assert_eq!(summary.successful_queries, 1);
        assert_eq!(summary.failed_queries, 1);
        assert_eq!(summary.error_rate, 0.5);
        monitor.shutdown();
    }

    #[test]
    fn slow_query_triggers_alert_handler() {
        let monitor = PerformanceMonitor::new(MonitorConfig {
            slow_query_threshold: Duration::from_millis(5),
            ..MonitorConfig::default()
        });
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_for_handler = fired.clone();
        monitor.register_alert_handler(Arc::new(move |alert: &PerformanceAlert| {
            if alert.kind == AlertKind::SlowQuery {
                fired_for_handler.fetch_add(1, Ordering::SeqCst);
            }
        }));

        monitor.record_query_metric(metric(true, Duration::from_millis(50)));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        monitor.shutdown();
    }

    #[test]
    fn panicking_handler_does_not_suppress_others() {
        let monitor = PerformanceMonitor::new(MonitorConfig {
            slow_query_threshold: Duration::from_millis(5),
            ..MonitorConfig::default()
        });
        let fired = Arc::new(AtomicUsize::new(0));
        monitor.register_alert_handler(Arc::new(|_: &PerformanceAlert| panic!("boom")));
        let fired_for_handler = fired.clone();
        monitor.register_alert_handler(Arc::new(move |_: &PerformanceAlert| {
            fired_for_handler.fetch_add(1, Ordering::SeqCst);
        }));

        monitor.record_query_metric(metric(true, Duration::from_millis(50)));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        monitor.shutdown();
    }

    #[test]
    fn pool_exhaustion_alert_on_high_utilization() {
        let monitor = PerformanceMonitor::new(MonitorConfig::default());
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_for_handler = fired.clone();
        monitor.register_alert_handler(Arc::new(move |alert: &PerformanceAlert| {
            if alert.kind == AlertKind::PoolExhaustion {
                fired_for_handler.fetch_add(1, Ordering::SeqCst);
            }
        }));

        monitor.update_connection_count(DatabaseKind::Postgres, 19, 20);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        monitor.shutdown();
    }
}
