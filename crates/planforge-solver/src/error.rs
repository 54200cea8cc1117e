//! Error types of the diversification engine.

use planforge_config::ConfigError;
use planforge_core::PlanError;
use thiserror::Error;

/// Failure of a single oracle call, as reported by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The call exceeded its wall-clock limit or the oracle gave up.
    #[error("timeout")]
    Timeout,

    /// The oracle panicked.
    #[error("oracle panicked: {0}")]
    Panicked(String),

    /// The oracle reported a failure.
    #[error("oracle failed: {0}")]
    Failed(String),

    /// The worker running the oracle went away without an answer.
    #[error("oracle worker disconnected")]
    Disconnected,
}

/// Errors raised while configuring or running a diversification loop.
#[derive(Debug, Error)]
pub enum DiversifyError {
    /// Missing or invalid behaviour space or planner configuration.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A dimension could not be evaluated on a produced plan.
    #[error("invalid plan for descriptor{}: {reason}", dimension_suffix(.dimension))]
    InvalidPlanForDescriptor {
        dimension: Option<String>,
        reason: String,
    },

    /// The oracle failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The oracle returned a plan that does not solve the problem.
    #[error("invalid plan from oracle: {0}")]
    InvalidPlan(#[source] PlanError),

    /// The oracle returned a plan whose behaviour was already forbidden.
    #[error("duplicate behaviour {signature}: oracle ignored the forbidding constraint")]
    DuplicateBehaviour { signature: String },
}

fn dimension_suffix(dimension: &Option<String>) -> String {
    dimension
        .as_ref()
        .map(|d| format!(" (dimension '{}')", d))
        .unwrap_or_default()
}

impl DiversifyError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        DiversifyError::Configuration(ConfigError::Invalid(msg.into()))
    }

    pub(crate) fn descriptor(dimension: Option<&str>, reason: impl ToString) -> Self {
        DiversifyError::InvalidPlanForDescriptor {
            dimension: dimension.map(str::to_string),
            reason: reason.to_string(),
        }
    }
}
