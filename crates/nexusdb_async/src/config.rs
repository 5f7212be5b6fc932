/// Worker-pool sizing for [`crate::AsyncExecutor`] (spec §4.4; default
/// worker count mirrors hardware concurrency).
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub worker_threads: usize,
    pub queue_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            queue_capacity: 1024,
        }
    }
}
