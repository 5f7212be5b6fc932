use crate::executor::{AsyncExecutor, TaskHandle};
use nexusdb_core::{DbDriver, DbError, QueryResult};
use std::sync::Arc;

/// Surface operations built on top of [`AsyncExecutor::submit`] (spec
/// §4.4): each wraps a driver call so the caller never blocks on backend
/// I/O.
pub fn execute_async(
    executor: &AsyncExecutor,
    driver: Arc<dyn DbDriver>,
    query: String,
) -> Result<TaskHandle<bool>, DbError> {
    executor.submit(move || driver.execute_query(&query))
}

pub fn select_async(
    executor: &AsyncExecutor,
    driver: Arc<dyn DbDriver>,
    query: String,
) -> Result<TaskHandle<QueryResult>, DbError> {
    executor.submit(move || driver.select_query(&query))
}

/// Each sub-query runs on its own worker slot; result order mirrors input
/// order regardless of completion order (spec §4.4).
pub fn execute_batch_async(
    executor: &AsyncExecutor,
    driver: Arc<dyn DbDriver>,
    queries: Vec<String>,
) -> Result<TaskHandle<Vec<bool>>, DbError> {
    executor.submit(move || queries.iter().map(|q| driver.execute_query(q)).collect())
}

pub fn select_batch_async(
    executor: &AsyncExecutor,
    driver: Arc<dyn DbDriver>,
    queries: Vec<String>,
) -> Result<TaskHandle<Vec<QueryResult>>, DbError> {
    executor.submit(move || queries.iter().map(|q| driver.select_query(q)).collect())
}

/// Serialized on the single participating driver, per spec §4.4.
pub fn begin_transaction_async(
    executor: &AsyncExecutor,
    driver: Arc<dyn DbDriver>,
) -> Result<TaskHandle<bool>, DbError> {
    executor.submit(move || driver.execute_query("BEGIN"))
}

pub fn commit_transaction_async(
    executor: &AsyncExecutor,
    driver: Arc<dyn DbDriver>,
) -> Result<TaskHandle<bool>, DbError> {
    executor.submit(move || driver.execute_query("COMMIT"))
}

pub fn rollback_transaction_async(
    executor: &AsyncExecutor,
    driver: Arc<dyn DbDriver>,
) -> Result<TaskHandle<bool>, DbError> {
    executor.submit(move || driver.execute_query("ROLLBACK"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutorConfig;
    use nexusdb_core::DatabaseKind;
    use nexusdb_test_support::FakeDriver;

    #[tokio::test]
    async fn execute_batch_preserves_order() {
        let executor = AsyncExecutor::new(ExecutorConfig {
            worker_threads: 4,
            queue_capacity: 16,
        });
        let driver: Arc<dyn DbDriver> = Arc::new(
            FakeDriver::new(DatabaseKind::Sqlite).fail_query("bad"),
        );

        let handle = execute_batch_async(
            &executor,
            driver,
            vec!["ok1".to_string(), "bad".to_string(), "ok2".to_string()],
        )
        .unwrap();

        let results = handle.join().await.unwrap();
        assert_eq!(results, vec![true, false, true]);
        executor.shutdown();
    }
}
