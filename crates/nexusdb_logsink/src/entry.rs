use std::time::SystemTime;

/// A single log record (spec §3 `LogEntry`). Ownership transfers into the
/// ring buffer on enqueue.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: log::Level,
    pub message: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub function: Option<&'static str>,
    pub timestamp: SystemTime,
}

impl LogEntry {
    pub fn new(level: log::Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            file: None,
            line: None,
            function: None,
            timestamp: SystemTime::now(),
        }
    }
}
