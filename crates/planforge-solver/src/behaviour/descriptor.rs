//! Behaviour description of plans.

use planforge_core::{Plan, PlanningProblem};

use super::{BehaviourSignature, BehaviourSpace};
use crate::error::DiversifyError;

/// Computes the behaviour signature of `plan` on `problem`.
///
/// Simulates the plan once and applies every dimension's feature to the
/// resulting trace, in space order. Deterministic and side-effect free.
///
/// # Errors
///
/// [`DiversifyError::InvalidPlanForDescriptor`] when the plan cannot be
/// simulated, or a dimension references a fluent or action schema the
/// problem lacks, or a feature cannot be evaluated on the trace.
pub fn describe(
    space: &BehaviourSpace,
    problem: &PlanningProblem,
    plan: &Plan,
) -> Result<BehaviourSignature, DiversifyError> {
    let trace = problem
        .simulate(plan)
        .map_err(|e| DiversifyError::descriptor(None, e))?;

    space
        .dimensions()
        .iter()
        .map(|dim| {
            let wrap = |reason: String| DiversifyError::descriptor(Some(dim.name()), reason);
            dim.feature().check(problem.model()).map_err(wrap)?;
            dim.feature()
                .evaluate(&trace)
                .map_err(|e| wrap(e.to_string()))
        })
        .collect()
}

impl BehaviourSpace {
    /// Shorthand for [`describe`].
    pub fn describe(
        &self,
        problem: &PlanningProblem,
        plan: &Plan,
    ) -> Result<BehaviourSignature, DiversifyError> {
        describe(self, problem, plan)
    }
}
