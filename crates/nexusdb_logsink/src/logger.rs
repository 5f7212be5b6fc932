use crate::entry::LogEntry;
use crate::sink::RingBufferSink;
use std::sync::Arc;

/// Adapts [`RingBufferSink`] to the `log` facade so core modules can emit
/// through `log::info!`/`log::error!` and have records flow through the
/// same backpressure-bounded path as everything else in C9.
pub struct RingBufferLogger {
    sink: Arc<RingBufferSink>,
}

impl RingBufferLogger {
    pub fn new(sink: Arc<RingBufferSink>) -> Self {
        Self { sink }
    }
}

impl log::Log for RingBufferLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let entry = LogEntry {
            level: record.level(),
            message: record.args().to_string(),
            file: record.file_static(),
            line: record.line(),
            function: record.module_path_static(),
            timestamp: std::time::SystemTime::now(),
        };
        self.sink.push(entry);
    }

    fn flush(&self) {
        self.sink.flush();
    }
}
