//! Termination conditions for diversification runs.
//!
//! Terminations are checked at the top of every iteration, before the
//! oracle is called.

mod composite;
mod external;
mod plan_count;
mod time;

use std::fmt::Debug;

use crate::scope::LoopScope;

pub use composite::OrTermination;
pub use external::ExternalTermination;
pub use plan_count::PlanCountTermination;
pub use time::TimeTermination;

/// Trait for determining when to stop a run.
pub trait Termination: Send + Sync + Debug {
    /// Returns true if the run should stop.
    fn is_terminated(&self, scope: &LoopScope) -> bool;
}

impl<T: Termination + ?Sized> Termination for Box<T> {
    fn is_terminated(&self, scope: &LoopScope) -> bool {
        (**self).is_terminated(scope)
    }
}
