//! Accepted-plan-count termination.

use planforge_config::PlanCount;

use super::Termination;
use crate::scope::LoopScope;

/// Terminates once the requested number of plans has been accepted.
///
/// # Example
///
/// ```
/// use planforge_solver::termination::PlanCountTermination;
///
/// let term = PlanCountTermination::new(5);
/// let unbounded = PlanCountTermination::unbounded();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PlanCountTermination {
    count: PlanCount,
}

impl PlanCountTermination {
    pub fn new(limit: usize) -> Self {
        Self {
            count: PlanCount::AtMost(limit),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            count: PlanCount::Unbounded,
        }
    }

    pub fn from_plan_count(count: PlanCount) -> Self {
        Self { count }
    }
}

impl Termination for PlanCountTermination {
    fn is_terminated(&self, scope: &LoopScope) -> bool {
        self.count.is_reached(scope.accepted_count())
    }
}
