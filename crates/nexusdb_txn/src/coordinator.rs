use crate::state::TransactionState;
use crate::transaction::DistributedTxn;
use nexusdb_async::AsyncExecutor;
use nexusdb_core::{DbDriver, DbError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Single-process distributed transaction coordinator (spec §4.5): drives
/// each [`DistributedTxn`] through 2PC, dispatching participant calls
/// concurrently through [`AsyncExecutor`] and treating each phase as a
/// barrier.
pub struct TransactionCoordinator {
    executor: Arc<AsyncExecutor>,
    transactions: Mutex<HashMap<String, DistributedTxn>>,
    transaction_timeout: Duration,
}

impl TransactionCoordinator {
    pub fn new(executor: Arc<AsyncExecutor>, transaction_timeout: Duration) -> Self {
        Self {
            executor,
            transactions: Mutex::new(HashMap::new()),
            transaction_timeout,
        }
    }

    pub fn begin_distributed_transaction(&self, participants: Vec<Arc<dyn DbDriver>>) -> String {
        let id = Uuid::new_v4().to_string();
        let txn = DistributedTxn::new(id.clone(), participants);
        self.transactions.lock().unwrap().insert(id.clone(), txn);
        id
    }

    /// Runs the full two-phase commit protocol (spec §4.5). Returns
    /// [`DbError::ParticipantDisagreement`] if any participant votes no or
    /// times out during prepare; commit-phase failures after a unanimous
    /// yes vote still drive the transaction to `committed` and are left for
    /// [`Self::recover_transactions`].
    pub async fn commit_distributed_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<bool, DbError> {
        let participants = self.participants_of(transaction_id)?;
        self.set_state(transaction_id, TransactionState::Preparing)?;

        let votes = self.run_phase(&participants, "PREPARE").await;
        let all_yes = votes.iter().all(|vote| *vote == Some(true));

        if all_yes {
            self.set_state(transaction_id, TransactionState::Prepared)?;
            self.set_state(transaction_id, TransactionState::Committing)?;

            let commit_results = self.run_phase(&participants, "COMMIT").await;
            if commit_results.iter().any(|result| *result != Some(true)) {
                log::error!(
                    "transaction {transaction_id} had commit-phase failures; recovery required"
                );
            }
            self.set_state(transaction_id, TransactionState::Committed)?;
            Ok(true)
        } else {
            self.set_state(transaction_id, TransactionState::Aborting)?;
            let to_rollback: Vec<_> = participants
                .iter()
                .zip(votes.iter())
                .filter(|(_, vote)| **vote != Some(false))
                .map(|(participant, _)| participant.clone())
                .collect();
            self.run_phase(&to_rollback, "ROLLBACK").await;
            self.set_state(transaction_id, TransactionState::Aborted)?;
            Err(DbError::ParticipantDisagreement(transaction_id.to_string()))
        }
    }

    /// Aborts a transaction directly, without attempting a prepare vote.
    pub async fn rollback_distributed_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<bool, DbError> {
        let participants = self.participants_of(transaction_id)?;
        self.set_state(transaction_id, TransactionState::Aborting)?;
        self.run_phase(&participants, "ROLLBACK").await;
        self.set_state(transaction_id, TransactionState::Aborted)?;
        Ok(true)
    }

    /// Scans non-terminal transactions whose last activity is older than
    /// twice the transaction timeout and drives them to a terminal state:
    /// re-issuing commit for anything that reached `prepared`/`committing`,
    /// rollback otherwise (spec §4.5).
    pub fn recover_transactions(&self) {
        let stale_after = self.transaction_timeout * 2;
        let stalled: Vec<(String, TransactionState, Vec<Arc<dyn DbDriver>>)> = {
            let transactions = self.transactions.lock().unwrap();
            transactions
                .values()
                .filter(|txn| !txn.state.is_terminal() && txn.last_activity.elapsed() > stale_after)
                .map(|txn| (txn.id.clone(), txn.state, txn.participants.clone()))
                .collect()
        };

        for (id, state, participants) in stalled {
            log::warn!("recovering stalled transaction {id} from state {state:?}");
            match state {
                TransactionState::Prepared | TransactionState::Committing => {
                    for participant in &participants {
                        participant.execute_query("COMMIT");
                    }
                    self.force_state(&id, TransactionState::Committed);
                }
                _ => {
                    for participant in &participants {
                        participant.execute_query("ROLLBACK");
                    }
                    self.force_state(&id, TransactionState::Aborted);
                }
            }
        }
    }

    pub fn get_active_transactions(&self) -> Vec<(String, TransactionState)> {
        self.transactions
            .lock()
            .unwrap()
            .values()
            .filter(|txn| !txn.state.is_terminal())
            .map(|txn| (txn.id.clone(), txn.state))
            .collect()
    }

    /// Drops terminal transactions whose last activity predates `retention`.
    pub fn cleanup_completed_transactions(&self, retention: Duration) {
        self.transactions.lock().unwrap().retain(|_, txn| {
            !(txn.state.is_terminal() && txn.last_activity.elapsed() > retention)
        });
    }

    fn participants_of(&self, transaction_id: &str) -> Result<Vec<Arc<dyn DbDriver>>, DbError> {
        self.transactions
            .lock()
            .unwrap()
            .get(transaction_id)
            .map(|txn| txn.participants.clone())
            .ok_or_else(|| DbError::ConfigurationInvalid(format!("unknown transaction {transaction_id}")))
    }

    fn set_state(&self, transaction_id: &str, next: TransactionState) -> Result<(), DbError> {
        let mut transactions = self.transactions.lock().unwrap();
        let txn = transactions.get_mut(transaction_id).ok_or_else(|| {
            DbError::ConfigurationInvalid(format!("unknown transaction {transaction_id}"))
        })?;
        if !txn.state.can_advance_to(next) {
            log::warn!(
                "rejected transition for {transaction_id}: {:?} -> {:?}",
                txn.state,
                next
            );
            return Err(DbError::ConfigurationInvalid(format!(
                "illegal transition {:?} -> {:?}",
                txn.state, next
            )));
        }
        txn.state = next;
        txn.last_activity = std::time::Instant::now();
        Ok(())
    }

    fn force_state(&self, transaction_id: &str, next: TransactionState) {
        if let Some(txn) = self.transactions.lock().unwrap().get_mut(transaction_id) {
            txn.state = next;
            txn.last_activity = std::time::Instant::now();
        }
    }

    /// Issues `verb` to every participant concurrently via the executor.
    /// Each vote resolves to `Some(true)`/`Some(false)` on completion, or
    /// `None` if the task was rejected or exceeded `transaction_timeout`
    /// (the mandatory suspension-point bound of spec §5).
    async fn run_phase(&self, participants: &[Arc<dyn DbDriver>], verb: &str) -> Vec<Option<bool>> {
        let handles: Vec<_> = participants
            .iter()
            .map(|participant| {
                let participant = participant.clone();
                let verb = verb.to_string();
                self.executor.submit(move || participant.execute_query(&verb))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let vote = match handle {
                Ok(handle) => match tokio::time::timeout(self.transaction_timeout, handle.join()).await {
                    Ok(Ok(vote)) => Some(vote),
                    Ok(Err(_)) | Err(_) => None,
                },
                Err(_) => None,
            };
            results.push(vote);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexusdb_async::ExecutorConfig;
    use nexusdb_core::DatabaseKind;
    use nexusdb_test_support::FakeDriver;

    fn coordinator() -> TransactionCoordinator {
        let executor = Arc::new(AsyncExecutor::new(ExecutorConfig {
            worker_threads: 4,
            queue_capacity: 32,
        }));
        TransactionCoordinator::new(executor, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn s3_two_phase_commit_happy_path() {
        let coordinator = coordinator();
        let participants: Vec<Arc<dyn DbDriver>> = (0..3)
            .map(|_| Arc::new(FakeDriver::new(DatabaseKind::Postgres)) as Arc<dyn DbDriver>)
            .collect();
        let id = coordinator.begin_distributed_transaction(participants);

        let result = coordinator.commit_distributed_transaction(&id).await;
        assert_eq!(result, Ok(true));
        assert!(coordinator.get_active_transactions().is_empty());
    }

    #[tokio::test]
    async fn s4_two_phase_commit_abort_on_dissenting_vote() {
        let coordinator = coordinator();
        let dissenter = FakeDriver::new(DatabaseKind::Postgres).fail_query("PREPARE");
        let participants: Vec<Arc<dyn DbDriver>> = vec![
            Arc::new(FakeDriver::new(DatabaseKind::Postgres)),
            Arc::new(dissenter),
            Arc::new(FakeDriver::new(DatabaseKind::Postgres)),
        ];
        let id = coordinator.begin_distributed_transaction(participants);

        let result = coordinator.commit_distributed_transaction(&id).await;
        assert!(matches!(result, Err(DbError::ParticipantDisagreement(_))));
    }
}
