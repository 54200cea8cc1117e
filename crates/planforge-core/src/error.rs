//! Error types for PlanForge

use thiserror::Error;

/// Main error type for problem-model operations
#[derive(Debug, Error)]
pub enum PlanForgeError {
    /// Error in the problem model definition
    #[error("Domain model error: {0}")]
    DomainModel(String),

    /// Expression evaluation failed
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Plan simulation failed
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// Plan does not satisfy the problem
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Failure to evaluate an expression against a state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown fluent '{0}'")]
    UnknownFluent(String),

    #[error("type mismatch in {op}: {detail}")]
    TypeMismatch { op: &'static str, detail: String },

    #[error("division by zero")]
    DivisionByZero,
}

/// Failure to simulate a plan against a problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("step {step}: unknown action '{action}'")]
    UnknownAction { step: usize, action: String },

    #[error("step {step}: effect on unknown fluent '{fluent}'")]
    UnknownEffectTarget { step: usize, fluent: String },

    #[error("step {step}: invalid start time {start}")]
    InvalidStart { step: usize, start: f64 },

    #[error("step {step} ({action}): {source}")]
    Effect {
        step: usize,
        action: String,
        #[source]
        source: EvalError,
    },
}

/// Reason a plan is not a solution of a problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("step {step} ({action}): precondition does not hold")]
    PreconditionViolated { step: usize, action: String },

    #[error("step {step} ({action}): could not evaluate precondition: {source}")]
    Precondition {
        step: usize,
        action: String,
        #[source]
        source: EvalError,
    },

    #[error("fluent '{fluent}' leaves its bounds after step {step}")]
    BoundsViolated { step: usize, fluent: String },

    #[error("goal does not hold in the final state")]
    GoalNotReached,

    #[error("could not evaluate goal: {0}")]
    Goal(#[source] EvalError),

    #[error("global constraint {index} is violated")]
    ConstraintViolated { index: usize },

    #[error("global constraint {index} could not be evaluated: {source}")]
    Constraint {
        index: usize,
        #[source]
        source: EvalError,
    },
}

/// Result type alias for PlanForge operations
pub type Result<T> = std::result::Result<T, PlanForgeError>;
