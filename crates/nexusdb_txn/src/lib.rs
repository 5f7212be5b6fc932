mod coordinator;
mod saga;
mod state;
mod transaction;

pub use coordinator::TransactionCoordinator;
pub use saga::{Saga, SagaBuilder};
pub use state::TransactionState;
pub use transaction::DistributedTxn;
