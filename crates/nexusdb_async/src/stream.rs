use nexusdb_core::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// A single event observed on a subscribed channel (Postgres LISTEN/NOTIFY,
/// MongoDB change stream, Redis pub/sub — spec §4.4 "related" stream
/// processor).
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub channel: String,
    pub payload: Value,
}

type Handler = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

/// One background thread per subscribed channel; each polled event is
/// dispatched to channel-specific handlers followed by global handlers. A
/// handler panic is isolated and does not suppress the others.
#[derive(Default)]
pub struct StreamProcessor {
    shutdown: Arc<AtomicBool>,
    global_handlers: Arc<Mutex<Vec<Handler>>>,
    channel_handlers: Arc<Mutex<HashMap<String, Vec<Handler>>>>,
    subscriptions: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl StreamProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_global_handler(&self, handler: Handler) {
        self.global_handlers.lock().unwrap().push(handler);
    }

    pub fn register_channel_handler(&self, channel: impl Into<String>, handler: Handler) {
        self.channel_handlers
            .lock()
            .unwrap()
            .entry(channel.into())
            .or_default()
            .push(handler);
    }

    /// Spawns the polling thread for `channel`. `poll` is called
    /// repeatedly; a `None` result means no event was ready and the thread
    /// backs off briefly before polling again.
    pub fn subscribe<P>(&self, channel: impl Into<String>, poll: P)
    where
        P: Fn() -> Option<Value> + Send + 'static,
    {
        let channel = channel.into();
        let shutdown = self.shutdown.clone();
        let global_handlers = self.global_handlers.clone();
        let channel_handlers = self.channel_handlers.clone();
        let channel_for_thread = channel.clone();

        let handle = std::thread::spawn(move || {
            while !shutdown.load(Ordering::SeqCst) {
                match poll() {
                    Some(payload) => {
                        let event = StreamEvent {
                            channel: channel_for_thread.clone(),
                            payload,
                        };
                        dispatch(&channel_handlers, &channel_for_thread, &event);
                        dispatch_all(&global_handlers, &event);
                    }
                    None => std::thread::sleep(Duration::from_millis(20)),
                }
            }
        });

        self.subscriptions.lock().unwrap().insert(channel, handle);
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for (_, handle) in self.subscriptions.lock().unwrap().drain() {
            let _ = handle.join();
        }
    }
}

fn dispatch(map: &Mutex<HashMap<String, Vec<Handler>>>, channel: &str, event: &StreamEvent) {
    let handlers = map.lock().unwrap().get(channel).cloned();
    if let Some(handlers) = handlers {
        invoke_all(&handlers, event);
    }
}

fn dispatch_all(handlers: &Mutex<Vec<Handler>>, event: &StreamEvent) {
    let handlers = handlers.lock().unwrap().clone();
    invoke_all(&handlers, event);
}

fn invoke_all(handlers: &[Handler], event: &StreamEvent) {
    for handler in handlers {
        if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
            log::error!("stream handler panicked on channel {}", event.channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn channel_handler_runs_before_global_and_survives_panics() {
        let processor = StreamProcessor::new();
        let order = Arc::new(StdMutex::new(Vec::new()));
        let emitted = Arc::new(AtomicUsize::new(0));

        {
            let order = order.clone();
            processor.register_channel_handler(
                "events",
                Arc::new(move |_event: &StreamEvent| {
                    order.lock().unwrap().push("channel");
                }),
            );
        }
        processor.register_global_handler(Arc::new(|_event: &StreamEvent| {
            panic!("boom");
        }));
        {
            let order = order.clone();
            processor.register_global_handler(Arc::new(move |_event: &StreamEvent| {
                order.lock().unwrap().push("global");
            }));
        }

        let emitted_for_poll = emitted.clone();
        processor.subscribe("events", move || {
            if emitted_for_poll.fetch_add(1, Ordering::SeqCst) == 0 {
                Some(Value::Int64(1))
            } else {
                None
            }
        });

        std::thread::sleep(Duration::from_millis(100));
        processor.shutdown();

        let order = order.lock().unwrap();
        assert_eq!(order.as_slice(), ["channel", "global"]);
    }
}
