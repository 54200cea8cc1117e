//! PlanForge - Behaviour-Diverse Plan Generation in Rust
//!
//! Wraps any single-shot planner (an [`Oracle`]) and returns up to `k` plans
//! that differ in behaviour, not just in action order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use planforge::prelude::*;
//! use planforge_test::{delivery_problem, EnumeratingOracle};
//!
//! let options = PlannerOptions::new()
//!     .with_dimension(DimensionConfig::new(FeatureConfig::ResourceUsage {
//!         fluent: "fuel".into(),
//!     }))
//!     .with_k(5);
//! let diversifier =
//!     DiversificationLoop::from_options(&options, Arc::new(EnumeratingOracle::new(3))).unwrap();
//!
//! let result = diversifier.plan(&delivery_problem());
//! assert_eq!(result.len(), 3);
//! ```

// Planning model
pub use planforge_core::{
    Constraint, Expr, Feature, Oracle, OracleContext, OracleOptions, OracleOutcome, Plan,
    PlanningProblem, ProblemBuilder, ProblemFeature, ProblemKind, Value,
};

// Configuration
pub use planforge_config::{
    BehaviourSpaceConfig, DimensionConfig, FeatureConfig, PlannerOptions, ToleranceConfig,
};

// Diversification engine
pub use planforge_solver::{
    BehaviourSignature, BehaviourSpace, DiversificationLoop, DiversifyError, DiversifyResult,
    IterationLogEntry, IterationOutcome, RunStatus, Tolerance,
};

mod plugin;
pub use plugin::{FbiPlanner, PlanGenerationResult, PlanGenerationResults, PlanGenerationStatus};

/// Colored console output. Only with the `console` feature.
#[cfg(feature = "console")]
pub use planforge_console as console;

pub mod prelude {
    pub use super::{
        BehaviourSignature, DimensionConfig, DiversificationLoop, FbiPlanner, FeatureConfig,
        Oracle, Plan, PlannerOptions, PlanningProblem, RunStatus, ToleranceConfig,
    };
}
