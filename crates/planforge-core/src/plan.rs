//! Plans produced by the oracle.

use std::fmt;

/// One step of a plan: a grounded action, optionally pinned to a start time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    /// Grounded action name, e.g. `drive(t1,a,b)`.
    pub action: String,
    /// Explicit start time. `None` places the step right after the previous one ends.
    pub start: Option<f64>,
}

impl PlanStep {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            start: None,
        }
    }

    pub fn at(action: impl Into<String>, start: f64) -> Self {
        Self {
            action: action.into(),
            start: Some(start),
        }
    }
}

/// A sequential or partially ordered plan.
///
/// Steps without a start time form a totally ordered sequence; steps that
/// share a start time execute concurrently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    /// Builds a totally ordered plan from grounded action names.
    pub fn sequential<I, A>(actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            steps: actions.into_iter().map(PlanStep::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.action.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match step.start {
                Some(t) => write!(f, "{}@{}", step.action, t)?,
                None => write!(f, "{}", step.action)?,
            }
        }
        write!(f, "]")
    }
}

impl<A: Into<String>> FromIterator<A> for Plan {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Plan::sequential(iter)
    }
}
