//! The diversification loop.
//!
//! Solve, describe, forbid, repeat: every accepted plan's behaviour region is
//! added to the forbidding constraint before the next oracle call, so the
//! oracle can only return plans with new behaviour. The loop stops when the
//! requested count is reached, the constrained problem is unsolvable, an
//! iteration fails, or the run is cancelled.
//!
//! Logging levels:
//! - **INFO**: Run start/end, accepted plans
//! - **DEBUG**: Oracle calls and constraint growth
//! - **WARN**: Oracle errors, invalid plans, descriptor failures, duplicate
//!   behaviour

mod parallel;
mod result;


pub use parallel::plan_independent;
pub use result::{DiversifyResult, IterationLogEntry, IterationOutcome, RunStatus};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use planforge_config::{NormalizedPlannerConfig, PlannerOptions};
use planforge_core::{Oracle, Plan, PlanningProblem};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::adapter::{BasePlannerAdapter, PlanResult};
use crate::behaviour::{BehaviourSignature, BehaviourSpace};
use crate::builder::BehaviourSpaceBuilder;
use crate::error::DiversifyError;
use crate::event::{DiversifyEventListener, DiversifyEventSupport};
use crate::forbid::ForbiddenRegions;
use crate::scope::LoopScope;
use crate::statistics::RunStatistics;
use crate::termination::{
    ExternalTermination, PlanCountTermination, Termination, TimeTermination,
};

/// Turns a single-shot oracle into a generator of behaviourally distinct
/// plans.
///
/// A loop is immutable once built; every [`plan`](Self::plan) call owns its
/// forbidden regions, so one loop may serve several problems in turn.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use planforge_config::{DimensionConfig, FeatureConfig, PlannerOptions};
/// use planforge_solver::{DiversificationLoop, RunStatus};
/// use planforge_test::{delivery_problem, EnumeratingOracle};
///
/// let options = PlannerOptions::new()
///     .with_dimension(DimensionConfig::new(FeatureConfig::ResourceUsage {
///         fluent: "fuel".into(),
///     }))
///     .with_k(5);
/// let diversifier =
///     DiversificationLoop::from_options(&options, Arc::new(EnumeratingOracle::new(3))).unwrap();
///
/// let result = diversifier.plan(&delivery_problem());
/// assert_eq!(result.len(), 3);
/// assert_eq!(result.status, RunStatus::Exhausted);
/// ```
#[derive(Debug)]
pub struct DiversificationLoop {
    space: BehaviourSpace,
    config: NormalizedPlannerConfig,
    adapter: BasePlannerAdapter,
    cancel: Arc<AtomicBool>,
    terminations: Vec<Box<dyn Termination>>,
    events: DiversifyEventSupport,
}

impl DiversificationLoop {
    pub fn new(
        space: BehaviourSpace,
        config: NormalizedPlannerConfig,
        oracle: Arc<dyn Oracle>,
    ) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let adapter = BasePlannerAdapter::new(oracle)
            .with_timeout(config.oracle_timeout)
            .with_cancel_flag(Arc::clone(&cancel));
        let mut terminations: Vec<Box<dyn Termination>> = Vec::new();
        if let Some(limit) = config.time_limit {
            terminations.push(Box::new(TimeTermination::new(limit)));
        }
        Self {
            space,
            config,
            adapter,
            cancel,
            terminations,
            events: DiversifyEventSupport::new(),
        }
    }

    /// Builds a loop from validated planner options.
    ///
    /// # Errors
    ///
    /// [`DiversifyError::Configuration`] when `bspace-cfg` or its `dims` are
    /// missing or invalid. Nothing is solved in that case.
    pub fn from_options(
        options: &PlannerOptions,
        oracle: Arc<dyn Oracle>,
    ) -> Result<Self, DiversifyError> {
        let config = options.normalize()?;
        let space = BehaviourSpaceBuilder::build(options.behaviour_space()?)?;
        Ok(Self::new(space, config, oracle))
    }

    /// Shares a cancellation flag with the host.
    ///
    /// Checked before every oracle call and visible to the oracle itself.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.adapter = self.adapter.with_cancel_flag(Arc::clone(&flag));
        self.cancel = flag;
        self
    }

    /// Adds a termination checked before every oracle call.
    pub fn with_termination(mut self, termination: impl Termination + 'static) -> Self {
        self.terminations.push(Box::new(termination));
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn DiversifyEventListener>) {
        self.events.add_listener(listener);
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn space(&self) -> &BehaviourSpace {
        &self.space
    }

    pub fn config(&self) -> &NormalizedPlannerConfig {
        &self.config
    }

    /// Generates up to `k` behaviourally distinct plans for `problem`.
    pub fn plan(&self, problem: &PlanningProblem) -> DiversifyResult {
        // Nobody listens; accepted plans are only returned.
        let (sender, _receiver) = mpsc::unbounded_channel();
        self.plan_with_channel(problem, sender)
    }

    /// Like [`plan`](Self::plan), also streaming every accepted plan with its
    /// signature through `sender` as soon as it is accepted.
    pub fn plan_with_channel(
        &self,
        problem: &PlanningProblem,
        sender: mpsc::UnboundedSender<(Plan, BehaviourSignature)>,
    ) -> DiversifyResult {
        let mut run = Run::new(self, problem);

        info!(
            event = "diversify_start",
            problem = problem.name(),
            oracle = self.adapter.oracle_name(),
            dimensions = self.space.len(),
            k = ?self.config.plan_count.limit(),
        );
        self.events.fire_run_started(problem);

        let plan_count = PlanCountTermination::from_plan_count(self.config.plan_count);
        let external = ExternalTermination::new(self.cancel_flag());
        let status = loop {
            if plan_count.is_terminated(&run.scope) {
                break RunStatus::LimitReached;
            }
            if external.is_terminated(&run.scope)
                || self.terminations.iter().any(|t| t.is_terminated(&run.scope))
            {
                run.log(IterationOutcome::Cancelled, Duration::ZERO);
                break RunStatus::Cancelled;
            }
            if let Some(status) = run.step(&sender) {
                break status;
            }
        };

        run.finish(status)
    }
}

/// State of one `plan()` call.
struct Run<'a> {
    owner: &'a DiversificationLoop,
    base: &'a PlanningProblem,
    current: PlanningProblem,
    forbidden: ForbiddenRegions,
    plans: Vec<Plan>,
    signatures: Vec<BehaviourSignature>,
    log: Vec<IterationLogEntry>,
    scope: LoopScope,
}

impl<'a> Run<'a> {
    fn new(owner: &'a DiversificationLoop, base: &'a PlanningProblem) -> Self {
        Self {
            owner,
            base,
            current: base.clone(),
            forbidden: ForbiddenRegions::new(&owner.space),
            plans: Vec::new(),
            signatures: Vec::new(),
            log: Vec::new(),
            scope: LoopScope::new(),
        }
    }

    /// Runs one iteration; returns the final status when the run is over.
    fn step(
        &mut self,
        sender: &mpsc::UnboundedSender<(Plan, BehaviourSignature)>,
    ) -> Option<RunStatus> {
        let iteration = self.log.len() + 1;
        debug!(
            event = "oracle_call",
            iteration = iteration,
            constraints = self.current.constraints().len(),
            forbidden = self.forbidden.len(),
        );

        let started = Instant::now();
        let result = self
            .owner
            .adapter
            .solve(&self.current, &self.owner.config.options);
        let elapsed = started.elapsed();
        self.scope.record_oracle_call(elapsed);

        match result {
            PlanResult::Found(plan) => self.found(iteration, plan, elapsed, sender),
            PlanResult::Unsolvable => {
                debug!(event = "oracle_unsolvable", iteration = iteration);
                self.log(IterationOutcome::Failed, elapsed);
                Some(RunStatus::Exhausted)
            }
            PlanResult::Error(err) => {
                self.fail(iteration, DiversifyError::Oracle(err), elapsed);
                Some(RunStatus::Aborted)
            }
        }
    }

    /// Validates and describes an oracle plan, accepting it when its
    /// behaviour is new.
    fn found(
        &mut self,
        iteration: usize,
        plan: Plan,
        elapsed: Duration,
        sender: &mpsc::UnboundedSender<(Plan, BehaviourSignature)>,
    ) -> Option<RunStatus> {
        // Against the base problem: a plan that only breaks the forbidding
        // constraint is reported as a duplicate instead.
        if let Err(source) = self.base.validate(&plan) {
            self.fail(iteration, DiversifyError::InvalidPlan(source), elapsed);
            return Some(RunStatus::Aborted);
        }

        match self.owner.space.describe(self.base, &plan) {
            Ok(signature) if self.forbidden.is_forbidden(&signature) => {
                let err = DiversifyError::DuplicateBehaviour {
                    signature: signature.to_string(),
                };
                self.fail(iteration, err, elapsed);
                Some(RunStatus::Aborted)
            }
            Ok(signature) => {
                self.accept(plan, signature, elapsed, sender);
                None
            }
            Err(err) => {
                self.fail(iteration, err, elapsed);
                Some(RunStatus::Aborted)
            }
        }
    }

    fn accept(
        &mut self,
        plan: Plan,
        signature: BehaviourSignature,
        elapsed: Duration,
        sender: &mpsc::UnboundedSender<(Plan, BehaviourSignature)>,
    ) {
        self.forbidden.insert(signature.clone());
        self.current = self.base.with_constraint(self.forbidden.constraint());
        self.scope.accept_plan();

        let index = self.plans.len() + 1;
        info!(
            event = "plan_found",
            index = index,
            steps = plan.len(),
            signature = %signature,
            oracle_ms = elapsed.as_millis() as u64,
        );
        self.owner.events.fire_plan_found(index, &plan, &signature);
        let _ = sender.send((plan.clone(), signature.clone()));

        self.plans.push(plan);
        self.signatures.push(signature.clone());
        self.log(IterationOutcome::Found { signature }, elapsed);
    }

    fn fail(&mut self, iteration: usize, err: DiversifyError, elapsed: Duration) {
        warn!(
            event = "iteration_failed",
            iteration = iteration,
            error = %err,
        );
        self.log(
            IterationOutcome::Error {
                detail: err.to_string(),
            },
            elapsed,
        );
    }

    fn log(&mut self, outcome: IterationOutcome, elapsed: Duration) {
        let entry = IterationLogEntry {
            index: self.log.len() + 1,
            outcome,
            elapsed,
        };
        self.owner.events.fire_iteration_ended(&entry);
        self.log.push(entry);
    }

    fn finish(self, status: RunStatus) -> DiversifyResult {
        let statistics = RunStatistics::from_scope(&self.scope);
        info!(
            event = "diversify_end",
            status = %status,
            plans = self.plans.len(),
            oracle_calls = statistics.oracle_calls,
            duration_ms = statistics.total_duration.as_millis() as u64,
        );
        self.owner.events.fire_run_ended(status, self.plans.len());
        DiversifyResult {
            plans: self.plans,
            signatures: self.signatures,
            log: self.log,
            status,
            statistics,
        }
    }
}
