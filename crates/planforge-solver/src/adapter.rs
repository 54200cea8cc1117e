//! Base planner adapter: a guarded call into the oracle.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, RecvTimeoutError};
use planforge_core::{Oracle, OracleContext, OracleOptions, OracleOutcome, Plan, PlanningProblem};
use tracing::warn;

use crate::error::OracleError;

/// Three-way result of one oracle call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanResult {
    Found(Plan),
    Unsolvable,
    Error(OracleError),
}

impl From<OracleOutcome> for PlanResult {
    fn from(outcome: OracleOutcome) -> Self {
        match outcome {
            OracleOutcome::Solved(plan) => PlanResult::Found(plan),
            OracleOutcome::Unsolvable => PlanResult::Unsolvable,
            OracleOutcome::Timeout => PlanResult::Error(OracleError::Timeout),
            OracleOutcome::Failed(msg) => PlanResult::Error(OracleError::Failed(msg)),
        }
    }
}

/// Calls the oracle and translates its outcome into a [`PlanResult`].
///
/// Panics inside the oracle never escape. With a timeout, the oracle runs on
/// a worker thread; when the limit passes the adapter returns
/// `Error(Timeout)` at once and leaves the worker detached. The worker sees
/// the expired deadline through its [`OracleContext`].
#[derive(Clone)]
pub struct BasePlannerAdapter {
    oracle: Arc<dyn Oracle>,
    timeout: Option<Duration>,
    cancel: Arc<AtomicBool>,
}

impl BasePlannerAdapter {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            timeout: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bounds every call by a wall-clock limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shares a cancellation flag with the oracle.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Solves `problem`, honouring its global constraints.
    pub fn solve(&self, problem: &PlanningProblem, options: &OracleOptions) -> PlanResult {
        let mut ctx = OracleContext::new().with_cancel_flag(Arc::clone(&self.cancel));
        match self.timeout {
            None => {
                let oracle = &self.oracle;
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| oracle.solve(problem, options, &ctx)));
                self.translate(outcome)
            }
            Some(timeout) => {
                ctx = ctx.with_timeout(timeout);
                self.solve_on_worker(problem, options, ctx, timeout)
            }
        }
    }

    fn solve_on_worker(
        &self,
        problem: &PlanningProblem,
        options: &OracleOptions,
        ctx: OracleContext,
        timeout: Duration,
    ) -> PlanResult {
        let (tx, rx) = channel::bounded(1);
        let oracle = Arc::clone(&self.oracle);
        let problem = problem.clone();
        let options = options.clone();

        let spawned = thread::Builder::new()
            .name("planforge-oracle".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    oracle.solve(&problem, &options, &ctx)
                }));
                let _ = tx.send(outcome);
            });
        if let Err(e) = spawned {
            return PlanResult::Error(OracleError::Failed(format!(
                "could not start oracle worker: {}",
                e
            )));
        }

        match rx.recv_timeout(timeout) {
            Ok(outcome) => self.translate(outcome),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    event = "oracle_timeout",
                    oracle = self.oracle.name(),
                    timeout_ms = timeout.as_millis() as u64,
                );
                PlanResult::Error(OracleError::Timeout)
            }
            Err(RecvTimeoutError::Disconnected) => PlanResult::Error(OracleError::Disconnected),
        }
    }

    fn translate(&self, outcome: thread::Result<OracleOutcome>) -> PlanResult {
        match outcome {
            Ok(outcome) => outcome.into(),
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                warn!(event = "oracle_panic", oracle = self.oracle.name(), message = %msg);
                PlanResult::Error(OracleError::Panicked(msg))
            }
        }
    }
}

impl std::fmt::Debug for BasePlannerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePlannerAdapter")
            .field("oracle", &self.oracle.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::oracle::oracle_fn;
    use planforge_test::{
        delivery_problem, EnumeratingOracle, PanickingOracle, ScriptedOracle, SleepingOracle,
    };
    use std::time::Instant;

    fn adapter(oracle: impl Oracle + 'static) -> BasePlannerAdapter {
        BasePlannerAdapter::new(Arc::new(oracle))
    }

    #[test]
    fn test_translates_native_outcomes() {
        let problem = delivery_problem();
        let options = OracleOptions::new();
        let scripted = adapter(ScriptedOracle::new([
            OracleOutcome::Solved(Plan::sequential(["walk"])),
            OracleOutcome::Timeout,
            OracleOutcome::Failed("no memory".into()),
            OracleOutcome::Unsolvable,
        ]));

        assert_eq!(
            scripted.solve(&problem, &options),
            PlanResult::Found(Plan::sequential(["walk"]))
        );
        assert_eq!(
            scripted.solve(&problem, &options),
            PlanResult::Error(OracleError::Timeout)
        );
        assert_eq!(
            scripted.solve(&problem, &options),
            PlanResult::Error(OracleError::Failed("no memory".into()))
        );
        assert_eq!(scripted.solve(&problem, &options), PlanResult::Unsolvable);
    }

    #[test]
    fn test_catches_panics() {
        let problem = delivery_problem();
        let inline = adapter(PanickingOracle);
        assert_eq!(
            inline.solve(&problem, &OracleOptions::new()),
            PlanResult::Error(OracleError::Panicked("oracle exploded".into()))
        );

        let worker = adapter(PanickingOracle).with_timeout(Some(Duration::from_secs(5)));
        assert_eq!(
            worker.solve(&problem, &OracleOptions::new()),
            PlanResult::Error(OracleError::Panicked("oracle exploded".into()))
        );
    }

    #[test]
    fn test_times_out_without_blocking() {
        let slow = adapter(SleepingOracle::new(Duration::from_secs(30)))
            .with_timeout(Some(Duration::from_millis(50)));
        let started = Instant::now();
        let result = slow.solve(&delivery_problem(), &OracleOptions::new());
        assert_eq!(result, PlanResult::Error(OracleError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_fast_oracle_within_timeout() {
        let fast = adapter(EnumeratingOracle::new(2)).with_timeout(Some(Duration::from_secs(10)));
        let result = fast.solve(&delivery_problem(), &OracleOptions::new());
        assert_eq!(result, PlanResult::Found(Plan::sequential(["drive_fast"])));
    }

    #[test]
    fn test_context_carries_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let probe = adapter(oracle_fn("probe", |_, _, ctx| {
            if ctx.is_cancelled() {
                OracleOutcome::Timeout
            } else {
                OracleOutcome::Unsolvable
            }
        }))
        .with_cancel_flag(flag);
        assert_eq!(
            probe.solve(&delivery_problem(), &OracleOptions::new()),
            PlanResult::Error(OracleError::Timeout)
        );
    }
}
