//! PlanForge Diversification Engine
//!
//! This crate turns a single-shot planning oracle into a generator of
//! behaviourally distinct plans:
//! - Behaviour spaces, dimensions and signatures
//! - Forbidding-constraint synthesis
//! - Base planner adapter with timeouts and panic isolation
//! - The forbid-and-iterate loop and its results
//! - Termination conditions
//! - Event system for monitoring
//! - Configuration wiring (builder module)

pub mod adapter;
pub mod behaviour;
pub mod builder;
pub mod diversify;
pub mod error;
pub mod event;
pub mod forbid;
pub mod scope;
pub mod statistics;
pub mod termination;

pub use adapter::{BasePlannerAdapter, PlanResult};
pub use behaviour::{describe, BehaviourSignature, BehaviourSpace, Dimension, Tolerance};
pub use builder::BehaviourSpaceBuilder;
pub use diversify::{
    plan_independent, DiversificationLoop, DiversifyResult, IterationLogEntry, IterationOutcome,
    RunStatus,
};
pub use error::{DiversifyError, OracleError};
pub use event::{CountingEventListener, DiversifyEventListener, DiversifyEventSupport};
pub use forbid::{region, synthesize, ForbiddenRegions};
pub use scope::LoopScope;
pub use statistics::RunStatistics;
pub use termination::{
    ExternalTermination, OrTermination, PlanCountTermination, Termination, TimeTermination,
};
