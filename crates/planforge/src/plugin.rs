//! Host-framework plugin: the forbid-behaviour-iterative planner.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use planforge_config::{NormalizedPlannerConfig, PlannerOptions};
use planforge_core::{Oracle, Plan, PlanningProblem, ProblemFeature, ProblemKind};
use planforge_solver::{
    BehaviourSignature, BehaviourSpace, BehaviourSpaceBuilder, DiversificationLoop,
    DiversifyError, DiversifyResult, IterationLogEntry,
};
use tokio::sync::mpsc;

/// Status of one plan generation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanGenerationStatus {
    /// A valid plan; no optimality claim.
    SolvedSatisficing,
    /// No plan was found. Says nothing about the problem having none.
    UnsolvableIncompletely,
}

/// One result reported back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanGenerationResult {
    pub status: PlanGenerationStatus,
    pub plan: Option<Plan>,
    pub engine_name: String,
}

/// Everything a `solve` call reports: one result per plan plus the log.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanGenerationResults {
    pub results: Vec<PlanGenerationResult>,
    pub log: Vec<IterationLogEntry>,
    /// The underlying run, with signatures and statistics.
    pub run: DiversifyResult,
}

impl PlanGenerationResults {
    /// Plans in acceptance order.
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.results.iter().filter_map(|r| r.plan.as_ref())
    }

    pub fn is_solved(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.status == PlanGenerationStatus::SolvedSatisficing)
    }
}

/// Forbid-behaviour-iterative planner, exposed the way planning hosts
/// expect an engine: a name, a supported problem kind and a `solve` call.
///
/// Options are validated when the planner is built, so a bad `bspace-cfg`
/// fails before any problem is seen.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use planforge::{FbiPlanner, PlanGenerationStatus, PlannerOptions};
/// use planforge_test::{delivery_problem, EnumeratingOracle};
///
/// let options = PlannerOptions::from_toml_str(r#"
///     [bspace-cfg]
///     dims = [{ feature = { type = "resource_usage", fluent = "fuel" } }]
///
///     [base-planner-cfg]
///     k = 2
/// "#).unwrap();
///
/// let planner = FbiPlanner::from_options(options).unwrap();
/// let problem = delivery_problem();
/// assert!(FbiPlanner::supports(&problem.kind()));
///
/// let out = planner.solve(&problem, Arc::new(EnumeratingOracle::new(3)));
/// assert_eq!(out.results.len(), 2);
/// assert!(out.results.iter().all(|r| r.status == PlanGenerationStatus::SolvedSatisficing));
/// ```
#[derive(Debug, Clone)]
pub struct FbiPlanner {
    options: PlannerOptions,
    space: BehaviourSpace,
    config: NormalizedPlannerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl FbiPlanner {
    pub const NAME: &'static str = "FBIPlanner";

    /// Builds the planner, validating `bspace-cfg` and `base-planner-cfg`.
    pub fn from_options(options: PlannerOptions) -> Result<Self, DiversifyError> {
        let config = options.normalize()?;
        let space = BehaviourSpaceBuilder::build(options.behaviour_space()?)?;

        #[cfg(feature = "console")]
        planforge_console::init();

        Ok(Self {
            options,
            space,
            config,
            cancel: None,
        })
    }

    /// Shares a cancellation flag with every run this planner starts.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Problem features this planner handles.
    pub fn supported_kind() -> ProblemKind {
        [
            ProblemFeature::ActionBased,
            ProblemFeature::GeneralNumericPlanning,
            ProblemFeature::FlatTyping,
            ProblemFeature::HierarchicalTyping,
            ProblemFeature::ContinuousNumbers,
            ProblemFeature::DiscreteNumbers,
            ProblemFeature::BoundedTypes,
            ProblemFeature::NumericFluents,
            ProblemFeature::ObjectFluents,
            ProblemFeature::NegativeConditions,
            ProblemFeature::DisjunctiveConditions,
            ProblemFeature::Equalities,
            ProblemFeature::ConditionalEffects,
            ProblemFeature::IncreaseEffects,
            ProblemFeature::DecreaseEffects,
            ProblemFeature::FluentsInNumericAssignments,
        ]
        .into_iter()
        .collect()
    }

    /// Returns true if every feature of `kind` is supported.
    pub fn supports(kind: &ProblemKind) -> bool {
        kind.is_subset_of(&Self::supported_kind())
    }

    /// Builds the diversification loop this planner runs with `oracle`.
    pub fn diversifier(&self, oracle: Arc<dyn Oracle>) -> DiversificationLoop {
        let diversifier = DiversificationLoop::new(self.space.clone(), self.config.clone(), oracle);
        match &self.cancel {
            Some(flag) => diversifier.with_cancel_flag(Arc::clone(flag)),
            None => diversifier,
        }
    }

    /// Generates behaviourally distinct plans for `problem`.
    ///
    /// Returns one `SolvedSatisficing` result per plan, or a single
    /// `UnsolvableIncompletely` result when no plan was found.
    pub fn solve(
        &self,
        problem: &PlanningProblem,
        oracle: Arc<dyn Oracle>,
    ) -> PlanGenerationResults {
        self.report(self.diversifier(oracle).plan(problem))
    }

    /// Like [`solve`](Self::solve), also sending each plan through `sender`
    /// as soon as it is accepted.
    pub fn solve_with_channel(
        &self,
        problem: &PlanningProblem,
        oracle: Arc<dyn Oracle>,
        sender: mpsc::UnboundedSender<(Plan, BehaviourSignature)>,
    ) -> PlanGenerationResults {
        self.report(self.diversifier(oracle).plan_with_channel(problem, sender))
    }

    fn report(&self, run: DiversifyResult) -> PlanGenerationResults {
        let results = if run.is_empty() {
            vec![self.result(PlanGenerationStatus::UnsolvableIncompletely, None)]
        } else {
            run.plans
                .iter()
                .map(|plan| {
                    self.result(PlanGenerationStatus::SolvedSatisficing, Some(plan.clone()))
                })
                .collect()
        };

        PlanGenerationResults {
            results,
            log: run.log.clone(),
            run,
        }
    }

    fn result(&self, status: PlanGenerationStatus, plan: Option<Plan>) -> PlanGenerationResult {
        PlanGenerationResult {
            status,
            plan,
            engine_name: Self::NAME.to_string(),
        }
    }
}
