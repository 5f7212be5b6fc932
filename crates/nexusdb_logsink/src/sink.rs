use crate::entry::LogEntry;
use crate::writer::LogWriter;
use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

const DEFAULT_CAPACITY: usize = 16_384;
const DRAIN_BATCH: usize = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct SinkStats {
    pub processed: u64,
    pub dropped: u64,
    pub current_size: usize,
    pub capacity: usize,
}

impl SinkStats {
    pub fn drop_rate(&self) -> f64 {
        let total = self.processed + self.dropped;
        if total == 0 {
            0.0
        } else {
            self.dropped as f64 / total as f64
        }
    }
}

struct Shared {
    queue: ArrayQueue<LogEntry>,
    writers: Mutex<Vec<Arc<dyn LogWriter>>>,
    has_work: AtomicBool,
    processed: AtomicU64,
    dropped: AtomicU64,
    stop: AtomicBool,
    wake_mutex: Mutex<()>,
    wake_cv: Condvar,
}

/// Lock-free MPSC ring buffer of bounded capacity (spec §4.8 / §9, power-of-
/// two default capacity 16384). Producers never block: a full ring
/// increments a dropped-count atomic instead. A single consumer thread
/// drains up to 256 entries per wake and fans each batch out to every
/// registered writer in declaration order.
pub struct RingBufferSink {
    shared: Arc<Shared>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl RingBufferSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let shared = Arc::new(Shared {
            queue: ArrayQueue::new(capacity.next_power_of_two()),
            writers: Mutex::new(Vec::new()),
            has_work: AtomicBool::new(false),
            processed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            stop: AtomicBool::new(false),
            wake_mutex: Mutex::new(()),
            wake_cv: Condvar::new(),
        });

        let consumer_shared = shared.clone();
        let consumer = std::thread::spawn(move || consume_loop(consumer_shared));

        Self {
            shared,
            consumer: Mutex::new(Some(consumer)),
        }
    }

    pub fn add_writer(&self, writer: Arc<dyn LogWriter>) {
        self.shared.writers.lock().unwrap().push(writer);
    }

    pub fn clear_writers(&self) {
        self.shared.writers.lock().unwrap().clear();
    }

    /// Attempts a single-slot push. Never blocks; returns `false` (and
    /// increments the dropped counter) if the ring is full.
    pub fn push(&self, entry: LogEntry) -> bool {
        match self.shared.queue.push(entry) {
            Ok(()) => {
                self.shared.has_work.store(true, Ordering::SeqCst);
                self.shared.wake_cv.notify_one();
                true
            }
            Err(_) => {
                self.shared.dropped.fetch_add(1, Ordering::SeqCst);
                false
            }
        }
    }

    /// Synchronously drains and dispatches whatever is currently queued.
    pub fn flush(&self) {
        loop {
            let batch = drain_batch(&self.shared, DRAIN_BATCH);
            if batch.is_empty() {
                break;
            }
            dispatch(&self.shared, &batch);
        }
        for writer in self.shared.writers.lock().unwrap().iter() {
            writer.flush();
        }
    }

    pub fn stats(&self) -> SinkStats {
        SinkStats {
            processed: self.shared.processed.load(Ordering::SeqCst),
            dropped: self.shared.dropped.load(Ordering::SeqCst),
            current_size: self.shared.queue.len(),
            capacity: self.shared.queue.capacity(),
        }
    }

    pub fn shutdown(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.wake_cv.notify_all();
        if let Some(handle) = self.consumer.lock().unwrap().take() {
            let _ = handle.join();
        }
        self.flush();
    }
}

impl Default for RingBufferSink {
    fn default() -> Self {
        Self::new()
    }
}

fn drain_batch(shared: &Shared, max: usize) -> Vec<LogEntry> {
    let mut batch = Vec::with_capacity(max.min(shared.queue.len().max(1)));
    while batch.len() < max {
        match shared.queue.pop() {
            Some(entry) => batch.push(entry),
            None => break,
        }
    }
    if shared.queue.is_empty() {
        shared.has_work.store(false, Ordering::SeqCst);
    }
    batch
}

fn dispatch(shared: &Shared, batch: &[LogEntry]) {
    let writers = shared.writers.lock().unwrap().clone();
    for writer in &writers {
        writer.write_batch(batch);
    }
    shared.processed.fetch_add(batch.len() as u64, Ordering::SeqCst);
}

fn consume_loop(shared: Arc<Shared>) {
    loop {
        let batch = drain_batch(&shared, DRAIN_BATCH);
        if !batch.is_empty() {
            dispatch(&shared, &batch);
            continue;
        }
        if shared.stop.load(Ordering::SeqCst) {
            return;
        }
        let guard = shared.wake_mutex.lock().unwrap();
        let _ = shared.wake_cv.wait_timeout(guard, Duration::from_millis(50)).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::MemoryWriter;

    #[test]
    fn pushed_entries_reach_the_writer() {
        let sink = RingBufferSink::new();
        let writer = Arc::new(MemoryWriter::new());
        sink.add_writer(writer.clone());

        for i in 0..10 {
            assert!(sink.push(LogEntry::new(log::Level::Info, format!("msg {i}"))));
        }

        std::thread::sleep(Duration::from_millis(100));
        sink.shutdown();

        assert_eq!(writer.entries().len(), 10);
        let stats = sink.stats();
        assert_eq!(stats.processed, 10);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn full_ring_drops_without_blocking() {
        let sink = RingBufferSink::with_capacity(2);
        for i in 0..64 {
            sink.push(LogEntry::new(log::Level::Warn, format!("msg {i}")));
        }
        let stats = sink.stats();
        assert!(stats.dropped > 0 || stats.processed > 0);
        sink.shutdown();
    }
}
