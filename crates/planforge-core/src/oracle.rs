//! The contract of the external single-shot planner.
//!
//! An [`Oracle`] receives a (possibly augmented) [`PlanningProblem`] and must
//! return a plan satisfying its goal *and* every global constraint attached to
//! it, prove that none exists, or fail. Calls are independent: an oracle must
//! not carry hidden state from one call to the next.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::plan::Plan;
use crate::problem::PlanningProblem;

/// An opaque option value forwarded to the oracle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<OptionValue>),
    Map(BTreeMap<String, OptionValue>),
}

impl OptionValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Float(v) => Some(*v),
            OptionValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{}", v),
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::String(v) => write!(f, "{:?}", v),
            OptionValue::List(items) => write!(f, "[{} items]", items.len()),
            OptionValue::Map(items) => write!(f, "{{{} keys}}", items.len()),
        }
    }
}

/// Options forwarded verbatim to the oracle.
pub type OracleOptions = BTreeMap<String, OptionValue>;

/// Native outcome of one oracle call.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleOutcome {
    /// A plan satisfying the goal and every global constraint.
    Solved(Plan),
    /// Proven that no such plan exists.
    Unsolvable,
    /// The oracle gave up because its deadline passed or it was cancelled.
    Timeout,
    /// Any other failure.
    Failed(String),
}

/// Per-call context: wall-clock deadline and cooperative cancellation.
#[derive(Debug, Clone)]
pub struct OracleContext {
    deadline: Option<Instant>,
    cancel: Arc<AtomicBool>,
}

impl Default for OracleContext {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleContext {
    pub fn new() -> Self {
        Self {
            deadline: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Returns true once the call was cancelled or its deadline passed.
    ///
    /// Long-running oracles should poll this and return
    /// [`OracleOutcome::Timeout`] when it flips.
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// An external single-shot planner.
pub trait Oracle: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "oracle"
    }

    /// Solves `problem`, honouring its global constraints.
    fn solve(
        &self,
        problem: &PlanningProblem,
        options: &OracleOptions,
        ctx: &OracleContext,
    ) -> OracleOutcome;
}

impl<O: Oracle + ?Sized> Oracle for Arc<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(
        &self,
        problem: &PlanningProblem,
        options: &OracleOptions,
        ctx: &OracleContext,
    ) -> OracleOutcome {
        (**self).solve(problem, options, ctx)
    }
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(
        &self,
        problem: &PlanningProblem,
        options: &OracleOptions,
        ctx: &OracleContext,
    ) -> OracleOutcome {
        (**self).solve(problem, options, ctx)
    }
}

/// Adapts a closure into an [`Oracle`].
///
/// # Example
///
/// ```
/// use planforge_core::oracle::{oracle_fn, Oracle, OracleContext, OracleOptions, OracleOutcome};
/// use planforge_core::PlanningProblem;
///
/// let oracle = oracle_fn("never", |_, _, _| OracleOutcome::Unsolvable);
/// let problem = PlanningProblem::builder("empty").build().unwrap();
/// let outcome = oracle.solve(&problem, &OracleOptions::new(), &OracleContext::new());
/// assert_eq!(outcome, OracleOutcome::Unsolvable);
/// assert_eq!(oracle.name(), "never");
/// ```
pub fn oracle_fn<F>(name: impl Into<String>, f: F) -> FnOracle<F>
where
    F: Fn(&PlanningProblem, &OracleOptions, &OracleContext) -> OracleOutcome + Send + Sync,
{
    FnOracle {
        name: name.into(),
        f,
    }
}

/// Closure-backed oracle created by [`oracle_fn`].
pub struct FnOracle<F> {
    name: String,
    f: F,
}

impl<F> fmt::Debug for FnOracle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOracle").field("name", &self.name).finish()
    }
}

impl<F> Oracle for FnOracle<F>
where
    F: Fn(&PlanningProblem, &OracleOptions, &OracleContext) -> OracleOutcome + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(
        &self,
        problem: &PlanningProblem,
        options: &OracleOptions,
        ctx: &OracleContext,
    ) -> OracleOutcome {
        (self.f)(problem, options, ctx)
    }
}
