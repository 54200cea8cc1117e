//! Results and iteration log of a diversification run.

use std::fmt;
use std::time::Duration;

use planforge_core::Plan;

use crate::behaviour::BehaviourSignature;
use crate::statistics::RunStatistics;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The requested number of plans was accepted (including `k <= 0`).
    LimitReached,
    /// The oracle proved no further distinct plan exists.
    Exhausted,
    /// An oracle or descriptor error ended the run.
    Aborted,
    /// The host cancelled the run or its time limit passed.
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::LimitReached => "limit_reached",
            RunStatus::Exhausted => "exhausted",
            RunStatus::Aborted => "aborted",
            RunStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Outcome of one iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum IterationOutcome {
    /// A plan was accepted with this signature.
    Found { signature: BehaviourSignature },
    /// The oracle reported the constrained problem unsolvable.
    Failed,
    /// The iteration failed; the detail says why (e.g. `timeout`).
    Error { detail: String },
    /// The run was stopped before calling the oracle.
    Cancelled,
}

impl IterationOutcome {
    /// Outcome tag: `found`, `failed`, `error: <detail>` or `cancelled`.
    pub fn tag(&self) -> String {
        match self {
            IterationOutcome::Found { .. } => "found".to_string(),
            IterationOutcome::Failed => "failed".to_string(),
            IterationOutcome::Error { detail } => format!("error: {}", detail),
            IterationOutcome::Cancelled => "cancelled".to_string(),
        }
    }

    pub fn signature(&self) -> Option<&BehaviourSignature> {
        match self {
            IterationOutcome::Found { signature } => Some(signature),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, IterationOutcome::Error { .. })
    }
}

/// One entry of the append-only iteration log.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationLogEntry {
    /// 1-based iteration index.
    pub index: usize,
    pub outcome: IterationOutcome,
    /// Time spent in the oracle call; zero for cancelled iterations.
    pub elapsed: Duration,
}

impl fmt::Display for IterationLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.outcome.tag())?;
        if let Some(signature) = self.outcome.signature() {
            write!(f, " {}", signature)?;
        }
        Ok(())
    }
}

/// Accepted plans, their signatures and the iteration log of one run.
///
/// `plans[i]` has signature `signatures[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiversifyResult {
    pub plans: Vec<Plan>,
    pub signatures: Vec<BehaviourSignature>,
    pub log: Vec<IterationLogEntry>,
    pub status: RunStatus,
    pub statistics: RunStatistics,
}

impl DiversifyResult {
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Returns true when the problem had no plan at all under the
    /// configured behaviour space: first call unsolvable.
    pub fn is_unsolvable(&self) -> bool {
        self.plans.is_empty()
            && self
                .log
                .first()
                .is_some_and(|e| e.outcome == IterationOutcome::Failed)
    }

    /// Detail of the error that ended the run, if any.
    pub fn error(&self) -> Option<&str> {
        self.log.iter().rev().find_map(|e| match &e.outcome {
            IterationOutcome::Error { detail } => Some(detail.as_str()),
            _ => None,
        })
    }

    /// Outcome tags in log order.
    pub fn tags(&self) -> Vec<String> {
        self.log.iter().map(|e| e.outcome.tag()).collect()
    }

    /// Iterates over accepted plans paired with their signatures.
    pub fn iter(&self) -> impl Iterator<Item = (&Plan, &BehaviourSignature)> {
        self.plans.iter().zip(&self.signatures)
    }
}
