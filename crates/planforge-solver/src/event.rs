//! Event system for monitoring diversification runs.
//!
//! Event listeners registered on a
//! [`DiversificationLoop`](crate::DiversificationLoop) receive notifications
//! about the run lifecycle, accepted plans and every logged iteration.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use planforge_core::Plan;
//! use planforge_solver::event::{DiversifyEventListener, DiversifyEventSupport};
//! use planforge_solver::BehaviourSignature;
//!
//! #[derive(Debug)]
//! struct MyListener;
//! impl DiversifyEventListener for MyListener {
//!     fn on_plan_found(&self, index: usize, plan: &Plan, signature: &BehaviourSignature) {
//!         println!("plan {} ({} steps): {}", index, plan.len(), signature);
//!     }
//! }
//!
//! let mut support = DiversifyEventSupport::new();
//! support.add_listener(Arc::new(MyListener));
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use planforge_core::{Plan, PlanningProblem};

use crate::behaviour::BehaviourSignature;
use crate::diversify::{IterationLogEntry, RunStatus};

/// Listener for diversification events.
pub trait DiversifyEventListener: Send + Sync + Debug {
    /// Called when a plan is accepted.
    ///
    /// # Arguments
    ///
    /// * `index` - 1-based position of the plan in the result
    /// * `plan` - The accepted plan
    /// * `signature` - Its behaviour signature
    fn on_plan_found(&self, index: usize, plan: &Plan, signature: &BehaviourSignature);

    /// Called before the first iteration.
    fn on_run_started(&self, _problem: &PlanningProblem) {}

    /// Called after every logged iteration.
    fn on_iteration_ended(&self, _entry: &IterationLogEntry) {}

    /// Called when the run ends.
    fn on_run_ended(&self, _status: RunStatus, _plan_count: usize) {}
}

/// Central event broadcaster for diversification events.
///
/// All listener methods are called synchronously in registration order.
#[derive(Default)]
pub struct DiversifyEventSupport {
    listeners: Vec<Arc<dyn DiversifyEventListener>>,
}

impl DiversifyEventSupport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn DiversifyEventListener>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn fire_run_started(&self, problem: &PlanningProblem) {
        for listener in &self.listeners {
            listener.on_run_started(problem);
        }
    }

    pub fn fire_plan_found(&self, index: usize, plan: &Plan, signature: &BehaviourSignature) {
        for listener in &self.listeners {
            listener.on_plan_found(index, plan, signature);
        }
    }

    pub fn fire_iteration_ended(&self, entry: &IterationLogEntry) {
        for listener in &self.listeners {
            listener.on_iteration_ended(entry);
        }
    }

    pub fn fire_run_ended(&self, status: RunStatus, plan_count: usize) {
        for listener in &self.listeners {
            listener.on_run_ended(status, plan_count);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl Clone for DiversifyEventSupport {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl Debug for DiversifyEventSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiversifyEventSupport")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A counting listener that tracks event occurrences.
///
/// Useful for testing and statistics collection.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    run_started_count: AtomicUsize,
    plan_found_count: AtomicUsize,
    iteration_count: AtomicUsize,
    run_ended_count: AtomicUsize,
}

impl CountingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_started_count(&self) -> usize {
        self.run_started_count.load(Ordering::SeqCst)
    }

    pub fn plan_found_count(&self) -> usize {
        self.plan_found_count.load(Ordering::SeqCst)
    }

    pub fn iteration_count(&self) -> usize {
        self.iteration_count.load(Ordering::SeqCst)
    }

    pub fn run_ended_count(&self) -> usize {
        self.run_ended_count.load(Ordering::SeqCst)
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.run_started_count.store(0, Ordering::SeqCst);
        self.plan_found_count.store(0, Ordering::SeqCst);
        self.iteration_count.store(0, Ordering::SeqCst);
        self.run_ended_count.store(0, Ordering::SeqCst);
    }
}

impl DiversifyEventListener for CountingEventListener {
    fn on_plan_found(&self, _index: usize, _plan: &Plan, _signature: &BehaviourSignature) {
        self.plan_found_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_run_started(&self, _problem: &PlanningProblem) {
        self.run_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_iteration_ended(&self, _entry: &IterationLogEntry) {
        self.iteration_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_run_ended(&self, _status: RunStatus, _plan_count: usize) {
        self.run_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
