mod config;
mod pool;
mod registry;
mod wrapper;

pub use config::{PoolConfig, PoolStats};
pub use pool::{ConnectionPool, DriverFactory};
pub use registry::PoolRegistry;
pub use wrapper::ConnectionWrapper;
