mod config;
mod executor;
mod ops;
mod stream;

pub use config::ExecutorConfig;
pub use executor::{AsyncExecutor, TaskHandle};
pub use ops::{
    begin_transaction_async, commit_transaction_async, execute_async, execute_batch_async,
    rollback_transaction_async, select_async, select_batch_async,
};
pub use stream::{StreamEvent, StreamProcessor};
