//! PlanForge Core - Planning-problem model and oracle contract
//!
//! This crate provides the fundamental abstractions for PlanForge:
//! - Values and expressions over grounded fluents
//! - The immutable planning-problem model and its constraint augmentation
//! - Plans, plan simulation and validation
//! - Behaviour features extracted from execution traces
//! - Global constraints over behaviour features
//! - The contract of the external single-shot planner (the oracle)

pub mod constraint;
pub mod error;
pub mod eval;
pub mod expr;
pub mod feature;
pub mod oracle;
pub mod plan;
pub mod problem;
pub mod trace;
pub mod value;

pub use constraint::{CmpOp, Constraint};
pub use error::{EvalError, PlanError, PlanForgeError, SimulationError};
pub use eval::{eval_expr, State};
pub use expr::Expr;
pub use feature::Feature;
pub use oracle::{OptionValue, Oracle, OracleContext, OracleOptions, OracleOutcome};
pub use plan::{Plan, PlanStep};
pub use problem::{
    ActionDef, Effect, EffectKind, FluentDef, FluentKind, ObjectDef, PlanningProblem,
    ProblemBuilder, ProblemFeature, ProblemKind, ProblemModel, TypeDef,
};
pub use trace::{TimedStep, Trace};
pub use value::Value;
