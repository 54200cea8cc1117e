//! Oracle fixtures.
//!
//! [`EnumeratingOracle`] is a bounded, exhaustive planner good enough for the
//! toy problems in [`crate::problems`]. The other oracles script or simulate
//! specific outcomes: fixed result sequences, slow calls and panics.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use planforge_core::{
    Oracle, OracleContext, OracleOptions, OracleOutcome, Plan, PlanError, PlanningProblem,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Iterative-deepening search over action sequences up to `max_depth` steps.
///
/// Returns the first shortest plan satisfying the goal and every global
/// constraint, or [`OracleOutcome::Unsolvable`] when none exists within the
/// depth bound. Action order is the problem's declaration order unless a seed
/// is given, in which case it is shuffled deterministically.
///
/// The oracle option `max_depth` overrides the configured bound.
#[derive(Debug, Clone)]
pub struct EnumeratingOracle {
    max_depth: usize,
    seed: Option<u64>,
}

enum Search {
    Found(Plan),
    NotFound,
    Stopped,
    Failed(String),
}

impl EnumeratingOracle {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn action_order(&self, problem: &PlanningProblem) -> Vec<String> {
        let mut names: Vec<String> = problem.actions().iter().map(|a| a.name.clone()).collect();
        if let Some(seed) = self.seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            names.shuffle(&mut rng);
        }
        names
    }

    fn dfs(
        problem: &PlanningProblem,
        actions: &[String],
        prefix: &mut Vec<String>,
        remaining: usize,
        ctx: &OracleContext,
    ) -> Search {
        if ctx.should_stop() {
            return Search::Stopped;
        }
        let plan = Plan::sequential(prefix.iter().cloned());
        match problem.validate(&plan) {
            Ok(_) => return Search::Found(plan),
            Err(
                PlanError::Simulation(_)
                | PlanError::Precondition { .. }
                | PlanError::PreconditionViolated { .. }
                | PlanError::BoundsViolated { .. },
            ) => return Search::NotFound,
            Err(e @ (PlanError::Goal(_) | PlanError::Constraint { .. })) => {
                return Search::Failed(e.to_string())
            }
            Err(PlanError::GoalNotReached | PlanError::ConstraintViolated { .. }) => {}
        }
        if remaining == 0 {
            return Search::NotFound;
        }
        for action in actions {
            prefix.push(action.clone());
            let result = Self::dfs(problem, actions, prefix, remaining - 1, ctx);
            prefix.pop();
            if !matches!(result, Search::NotFound) {
                return result;
            }
        }
        Search::NotFound
    }
}

impl Oracle for EnumeratingOracle {
    fn name(&self) -> &str {
        "enumerating"
    }

    fn solve(
        &self,
        problem: &PlanningProblem,
        options: &OracleOptions,
        ctx: &OracleContext,
    ) -> OracleOutcome {
        let max_depth = options
            .get("max_depth")
            .and_then(|v| v.as_i64())
            .and_then(|d| usize::try_from(d).ok())
            .unwrap_or(self.max_depth);
        let actions = self.action_order(problem);

        for depth in 0..=max_depth {
            let mut prefix = Vec::with_capacity(depth);
            match Self::dfs(problem, &actions, &mut prefix, depth, ctx) {
                Search::Found(plan) => return OracleOutcome::Solved(plan),
                Search::Stopped => return OracleOutcome::Timeout,
                Search::Failed(msg) => return OracleOutcome::Failed(msg),
                Search::NotFound => {}
            }
        }
        OracleOutcome::Unsolvable
    }
}

/// Returns a fixed sequence of outcomes, then `Unsolvable` forever.
///
/// Records the number of global constraints of every problem it receives.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<OracleOutcome>>,
    constraint_counts: Mutex<Vec<usize>>,
}

impl ScriptedOracle {
    pub fn new(script: impl IntoIterator<Item = OracleOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            constraint_counts: Mutex::new(Vec::new()),
        }
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.constraint_counts.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Number of global constraints seen on each call, in call order.
    pub fn constraint_counts(&self) -> Vec<usize> {
        self.constraint_counts
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(
        &self,
        problem: &PlanningProblem,
        _options: &OracleOptions,
        _ctx: &OracleContext,
    ) -> OracleOutcome {
        if let Ok(mut counts) = self.constraint_counts.lock() {
            counts.push(problem.constraints().len());
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or(OracleOutcome::Unsolvable)
    }
}

/// Counts calls to a wrapped oracle.
#[derive(Debug)]
pub struct CountingOracle<O> {
    inner: O,
    calls: AtomicUsize,
}

impl<O> CountingOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<O: Oracle> Oracle for CountingOracle<O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn solve(
        &self,
        problem: &PlanningProblem,
        options: &OracleOptions,
        ctx: &OracleContext,
    ) -> OracleOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.solve(problem, options, ctx)
    }
}

/// Sleeps for a fixed time before returning `Unsolvable`, giving up early
/// with `Timeout` once the context says to stop.
#[derive(Debug, Clone)]
pub struct SleepingOracle {
    duration: Duration,
}

impl SleepingOracle {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Oracle for SleepingOracle {
    fn name(&self) -> &str {
        "sleeping"
    }

    fn solve(
        &self,
        _problem: &PlanningProblem,
        _options: &OracleOptions,
        ctx: &OracleContext,
    ) -> OracleOutcome {
        let tick = Duration::from_millis(5);
        let mut slept = Duration::ZERO;
        while slept < self.duration {
            if ctx.should_stop() {
                return OracleOutcome::Timeout;
            }
            thread::sleep(tick);
            slept += tick;
        }
        OracleOutcome::Unsolvable
    }
}

/// Panics on every call.
#[derive(Debug, Clone, Default)]
pub struct PanickingOracle;

impl Oracle for PanickingOracle {
    fn name(&self) -> &str {
        "panicking"
    }

    fn solve(
        &self,
        _problem: &PlanningProblem,
        _options: &OracleOptions,
        _ctx: &OracleContext,
    ) -> OracleOutcome {
        panic!("oracle exploded")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::{counter_problem, delivery_problem};
    use planforge_core::{CmpOp, Constraint, Feature, OptionValue, Value};

    fn solve(oracle: &impl Oracle, problem: &PlanningProblem) -> OracleOutcome {
        oracle.solve(problem, &OracleOptions::new(), &OracleContext::new())
    }

    #[test]
    fn test_enumerating_finds_shortest_plan() {
        let outcome = solve(&EnumeratingOracle::new(6), &counter_problem(2));
        assert_eq!(outcome, OracleOutcome::Solved(Plan::sequential(["inc", "inc"])));
    }

    #[test]
    fn test_enumerating_honours_constraints() {
        let problem = counter_problem(2).with_constraint(Constraint::compare(
            Feature::PlanLength,
            CmpOp::Gt,
            Value::Int(2),
        ));
        let OracleOutcome::Solved(plan) = solve(&EnumeratingOracle::new(6), &problem) else {
            panic!("expected a plan");
        };
        assert_eq!(plan.len(), 4);
        assert!(problem.is_solution(&plan));
    }

    #[test]
    fn test_enumerating_depth_bound() {
        let oracle = EnumeratingOracle::new(1);
        assert_eq!(solve(&oracle, &counter_problem(2)), OracleOutcome::Unsolvable);

        let mut options = OracleOptions::new();
        options.insert("max_depth".into(), OptionValue::Int(2));
        let outcome = oracle.solve(&counter_problem(2), &options, &OracleContext::new());
        assert!(matches!(outcome, OracleOutcome::Solved(_)));
    }

    #[test]
    fn test_enumerating_is_deterministic_with_seed() {
        let oracle = EnumeratingOracle::new(2).with_seed(7);
        let first = solve(&oracle, &delivery_problem());
        let second = solve(&oracle, &delivery_problem());
        assert_eq!(first, second);
    }

    #[test]
    fn test_enumerating_stops_when_cancelled() {
        let ctx = OracleContext::new();
        ctx.cancel();
        let outcome =
            EnumeratingOracle::new(4).solve(&counter_problem(3), &OracleOptions::new(), &ctx);
        assert_eq!(outcome, OracleOutcome::Timeout);
    }

    #[test]
    fn test_scripted_oracle() {
        let oracle = ScriptedOracle::new([OracleOutcome::Timeout]);
        let problem = delivery_problem();
        assert_eq!(solve(&oracle, &problem), OracleOutcome::Timeout);
        assert_eq!(
            solve(&oracle, &problem.with_constraint(Constraint::True)),
            OracleOutcome::Unsolvable
        );
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(oracle.constraint_counts(), vec![0, 1]);
    }

    #[test]
    fn test_counting_oracle() {
        let oracle = CountingOracle::new(EnumeratingOracle::new(1));
        solve(&oracle, &delivery_problem());
        solve(&oracle, &delivery_problem());
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(oracle.name(), "enumerating");
    }
}
