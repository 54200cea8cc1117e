//! Independent runs in parallel.

use planforge_core::PlanningProblem;
use rayon::prelude::*;
use tracing::info;

use super::{DiversificationLoop, DiversifyResult};

/// Runs every loop on `problem` in parallel, one independent run per loop.
///
/// Runs share nothing but the problem, so each may use its own behaviour
/// space or oracle. Results are returned in loop order.
pub fn plan_independent(
    loops: &[DiversificationLoop],
    problem: &PlanningProblem,
) -> Vec<DiversifyResult> {
    info!(
        event = "parallel_start",
        problem = problem.name(),
        runs = loops.len(),
    );
    loops
        .par_iter()
        .map(|diversifier| diversifier.plan(problem))
        .collect()
}
