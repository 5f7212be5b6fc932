/// One forward action and its compensating action (spec §3 `SagaStep`).
struct SagaStep {
    action: Box<dyn Fn() -> bool + Send + Sync>,
    compensation: Box<dyn Fn() -> bool + Send + Sync>,
}

/// Builds an ordered list of `(action, compensation)` pairs for
/// [`Saga::execute`] (spec §4.5 saga variant).
#[derive(Default)]
pub struct SagaBuilder {
    steps: Vec<SagaStep>,
}

impl SagaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step<A, C>(mut self, action: A, compensation: C) -> Self
    where
        A: Fn() -> bool + Send + Sync + 'static,
        C: Fn() -> bool + Send + Sync + 'static,
    {
        self.steps.push(SagaStep {
            action: Box::new(action),
            compensation: Box::new(compensation),
        });
        self
    }

    pub fn build(self) -> Saga {
        Saga { steps: self.steps }
    }
}

/// Runs actions forward; on the first failure, compensations for the
/// already-successful prefix run in reverse order. A compensation failure
/// is logged but never aborts the sweep (spec §4.5, scenario S5).
pub struct Saga {
    steps: Vec<SagaStep>,
}

impl Saga {
    pub fn execute(&self) -> bool {
        let mut succeeded = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if (step.action)() {
                succeeded += 1;
                continue;
            }

            log::warn!("saga step {index} failed, compensating {succeeded} prior step(s)");
            for compensate_index in (0..succeeded).rev() {
                if !(self.steps[compensate_index].compensation)() {
                    log::error!("saga compensation for step {compensate_index} failed");
                }
            }
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn s5_compensation_runs_in_reverse_over_successful_prefix() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut builder = SagaBuilder::new();
        for index in 0..5usize {
            let action_log = log.clone();
            let compensation_log = log.clone();
            builder = builder.add_step(
                move || {
                    action_log.lock().unwrap().push(format!("action{index}"));
                    index != 3
                },
                move || {
                    compensation_log
                        .lock()
                        .unwrap()
                        .push(format!("compensate{index}"));
                    true
                },
            );
        }

        let saga = builder.build();
        assert!(!saga.execute());

        let observed = log.lock().unwrap().clone();
        assert_eq!(
            observed,
            vec![
                "action0",
                "action1",
                "action2",
                "action3",
                "compensate2",
                "compensate1",
                "compensate0",
            ]
        );
    }

    #[test]
    fn compensation_failure_does_not_abort_sweep() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let action0_log = log.clone();
        let compensation0_log = log.clone();
        let action1_log = log.clone();
        let saga = SagaBuilder::new()
            .add_step(
                move || {
                    action0_log.lock().unwrap().push("action0");
                    true
                },
                move || {
                    compensation0_log.lock().unwrap().push("compensate0");
                    false
                },
            )
            .add_step(
                move || {
                    action1_log.lock().unwrap().push("action1");
                    false
                },
                || true,
            )
            .build();

        assert!(!saga.execute());
        assert_eq!(*log.lock().unwrap(), vec!["action0", "action1", "compensate0"]);
    }
}
