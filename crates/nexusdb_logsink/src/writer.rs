use crate::entry::LogEntry;
use std::sync::Mutex;

/// A registered consumer of drained log batches (spec §4.8 "invokes every
/// registered writer in declaration order").
pub trait LogWriter: Send + Sync {
    fn write_batch(&self, entries: &[LogEntry]);
    fn flush(&self) {}
}

/// Writer used in tests and as a default sink: accumulates every entry it
/// sees so assertions can inspect what was written.
#[derive(Default)]
pub struct MemoryWriter {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl LogWriter for MemoryWriter {
    fn write_batch(&self, entries: &[LogEntry]) {
        self.entries.lock().unwrap().extend_from_slice(entries);
    }
}
