mod entry;
mod logger;
mod sink;
mod writer;

pub use entry::LogEntry;
pub use logger::RingBufferLogger;
pub use sink::{RingBufferSink, SinkStats};
pub use writer::{LogWriter, MemoryWriter};
