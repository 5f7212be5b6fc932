use crate::state::TransactionState;
use nexusdb_core::DbDriver;
use std::sync::Arc;
use std::time::Instant;

/// A single distributed transaction under coordination (spec §3
/// `DistributedTxn`). Destroyed once terminal and past the coordinator's
/// retention window.
pub struct DistributedTxn {
    pub id: String,
    pub participants: Vec<Arc<dyn DbDriver>>,
    pub state: TransactionState,
    pub start_time: Instant,
    pub last_activity: Instant,
}

impl DistributedTxn {
    pub fn new(id: String, participants: Vec<Arc<dyn DbDriver>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            participants,
            state: TransactionState::Active,
            start_time: now,
            last_activity: now,
        }
    }
}
