mod alert;
mod config;
mod export;
mod metric;
mod monitor;
mod summary;

pub use alert::{AlertKind, PerformanceAlert};
pub use config::MonitorConfig;
pub use metric::{fingerprint, ConnectionMetrics, QueryMetric};
pub use monitor::PerformanceMonitor;
pub use summary::PerformanceSummary;
