//! The planning-problem model.
//!
//! A [`PlanningProblem`] is an immutable, grounded [`ProblemModel`] shared
//! behind an `Arc`, plus an accumulating list of global [`Constraint`]s.
//! Augmenting a problem with a constraint produces a new problem and leaves
//! the original untouched, so the model itself is never copied.

mod builder;
mod kind;

#[cfg(test)]
mod tests;

pub use builder::ProblemBuilder;
pub use kind::{ProblemFeature, ProblemKind};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constraint::Constraint;
use crate::error::PlanError;
use crate::eval::{eval_bool, State};
use crate::expr::Expr;
use crate::plan::Plan;
use crate::trace::{self, Trace};

/// An object type, optionally derived from a parent type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub parent: Option<String>,
}

/// A typed object of the problem.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDef {
    pub name: String,
    pub type_name: String,
}

/// Value domain of a fluent.
#[derive(Debug, Clone, PartialEq)]
pub enum FluentKind {
    Bool,
    Int,
    Real,
    /// Holds the name of an object of the given type.
    Object { type_name: String },
}

impl FluentKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FluentKind::Int | FluentKind::Real)
    }
}

/// A grounded state variable.
#[derive(Debug, Clone, PartialEq)]
pub struct FluentDef {
    /// Grounded name, e.g. `fuel(truck1)`.
    pub name: String,
    pub kind: FluentKind,
    /// Inclusive lower bound for numeric fluents.
    pub lower: Option<f64>,
    /// Inclusive upper bound for numeric fluents.
    pub upper: Option<f64>,
}

impl FluentDef {
    pub fn new(name: impl Into<String>, kind: FluentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            lower: None,
            upper: None,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }
}

/// How an effect changes its target fluent.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    Assign(Expr),
    Increase(Expr),
    Decrease(Expr),
}

impl EffectKind {
    pub fn expr(&self) -> &Expr {
        match self {
            EffectKind::Assign(e) | EffectKind::Increase(e) | EffectKind::Decrease(e) => e,
        }
    }
}

/// A possibly conditional effect of an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub condition: Option<Expr>,
    pub fluent: String,
    pub kind: EffectKind,
}

impl Effect {
    pub fn assign(fluent: impl Into<String>, value: Expr) -> Self {
        Self {
            condition: None,
            fluent: fluent.into(),
            kind: EffectKind::Assign(value),
        }
    }

    pub fn increase(fluent: impl Into<String>, amount: Expr) -> Self {
        Self {
            condition: None,
            fluent: fluent.into(),
            kind: EffectKind::Increase(amount),
        }
    }

    pub fn decrease(fluent: impl Into<String>, amount: Expr) -> Self {
        Self {
            condition: None,
            fluent: fluent.into(),
            kind: EffectKind::Decrease(amount),
        }
    }

    /// Makes the effect conditional.
    pub fn when(mut self, condition: Expr) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A grounded action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDef {
    /// Grounded name, e.g. `drive(t1,a,b)`.
    pub name: String,
    /// Schema the action was grounded from, e.g. `drive`.
    pub schema: String,
    pub args: Vec<String>,
    pub precondition: Expr,
    pub effects: Vec<Effect>,
    pub duration: f64,
}

impl ActionDef {
    /// Creates an action with a trivially true precondition and unit duration.
    pub fn new<I, S>(schema: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = schema.into();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let name = if args.is_empty() {
            schema.clone()
        } else {
            format!("{}({})", schema, args.join(","))
        };
        Self {
            name,
            schema,
            args,
            precondition: Expr::bool(true),
            effects: Vec::new(),
            duration: 1.0,
        }
    }

    /// Creates an action without arguments.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(name, Vec::<String>::new())
    }

    pub fn with_precondition(mut self, precondition: Expr) -> Self {
        self.precondition = precondition;
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }
}

/// Immutable, grounded description of a planning problem.
#[derive(Debug, Clone)]
pub struct ProblemModel {
    pub name: String,
    pub types: Vec<TypeDef>,
    pub objects: Vec<ObjectDef>,
    pub fluents: Vec<FluentDef>,
    pub actions: Vec<ActionDef>,
    pub initial_state: State,
    pub goal: Expr,
    fluent_index: HashMap<String, usize>,
    action_index: HashMap<String, usize>,
}

impl ProblemModel {
    pub fn fluent(&self, name: &str) -> Option<&FluentDef> {
        self.fluent_index.get(name).map(|&i| &self.fluents[i])
    }

    pub fn action(&self, name: &str) -> Option<&ActionDef> {
        self.action_index.get(name).map(|&i| &self.actions[i])
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Returns true if some action was grounded from `schema`.
    pub fn has_schema(&self, schema: &str) -> bool {
        self.actions.iter().any(|a| a.schema == schema)
    }

    /// Returns true if `type_name` is `ancestor` or derives from it.
    pub fn is_subtype(&self, type_name: &str, ancestor: &str) -> bool {
        let mut current = Some(type_name);
        let mut hops = 0;
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.types.len() {
                return false;
            }
            current = self
                .types
                .iter()
                .find(|d| d.name == t)
                .and_then(|d| d.parent.as_deref());
        }
        false
    }
}

/// A planning problem: a shared base model plus accumulated global constraints.
#[derive(Debug, Clone)]
pub struct PlanningProblem {
    model: Arc<ProblemModel>,
    constraints: Vec<Constraint>,
}

impl PlanningProblem {
    pub fn new(model: ProblemModel) -> Self {
        Self {
            model: Arc::new(model),
            constraints: Vec::new(),
        }
    }

    /// Starts building a problem.
    pub fn builder(name: impl Into<String>) -> ProblemBuilder {
        ProblemBuilder::new(name)
    }

    pub fn model(&self) -> &ProblemModel {
        &self.model
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn initial_state(&self) -> &State {
        &self.model.initial_state
    }

    pub fn goal(&self) -> &Expr {
        &self.model.goal
    }

    pub fn actions(&self) -> &[ActionDef] {
        &self.model.actions
    }

    /// Returns a new problem equal to this one plus `constraint`.
    ///
    /// The base model is shared, not copied.
    pub fn with_constraint(&self, constraint: Constraint) -> Self {
        let mut constraints = Vec::with_capacity(self.constraints.len() + 1);
        constraints.extend(self.constraints.iter().cloned());
        constraints.push(constraint);
        Self {
            model: Arc::clone(&self.model),
            constraints,
        }
    }

    /// Returns true if both problems share the same base model.
    pub fn same_model(&self, other: &PlanningProblem) -> bool {
        Arc::ptr_eq(&self.model, &other.model)
    }

    /// Executes `plan` from the initial state, recording the fluent trajectory.
    ///
    /// Preconditions are not checked; see [`validate`](Self::validate).
    pub fn simulate(&self, plan: &Plan) -> Result<Trace, crate::error::SimulationError> {
        trace::simulate(&self.model, plan)
    }

    /// Checks that `plan` is a solution: every precondition holds, numeric
    /// bounds are respected, the goal holds at the end and every global
    /// constraint is satisfied by the trace.
    pub fn validate(&self, plan: &Plan) -> Result<Trace, PlanError> {
        let trace = self.simulate(plan)?;

        for (i, step) in trace.steps.iter().enumerate() {
            let action = self
                .model
                .action(&step.action)
                .ok_or_else(|| crate::error::SimulationError::UnknownAction {
                    step: step.index,
                    action: step.action.clone(),
                })?;
            let holds = eval_bool(&action.precondition, &trace.states[i], "precondition")
                .map_err(|source| PlanError::Precondition {
                    step: step.index,
                    action: step.action.clone(),
                    source,
                })?;
            if !holds {
                return Err(PlanError::PreconditionViolated {
                    step: step.index,
                    action: step.action.clone(),
                });
            }
            self.check_bounds(&trace.states[i + 1], step.index)?;
        }

        match eval_bool(&self.model.goal, trace.final_state(), "goal") {
            Ok(true) => {}
            Ok(false) => return Err(PlanError::GoalNotReached),
            Err(e) => return Err(PlanError::Goal(e)),
        }

        for (index, constraint) in self.constraints.iter().enumerate() {
            match constraint.evaluate(&trace) {
                Ok(true) => {}
                Ok(false) => return Err(PlanError::ConstraintViolated { index }),
                Err(source) => return Err(PlanError::Constraint { index, source }),
            }
        }

        Ok(trace)
    }

    /// Returns true if `plan` solves this problem.
    pub fn is_solution(&self, plan: &Plan) -> bool {
        self.validate(plan).is_ok()
    }

    /// Derives the feature set this problem uses.
    pub fn kind(&self) -> ProblemKind {
        ProblemKind::of(self)
    }

    fn check_bounds(&self, state: &State, step: usize) -> Result<(), PlanError> {
        for fluent in self.model.fluents.iter().filter(|f| f.is_bounded()) {
            let Some(value) = state.get(&fluent.name).and_then(|v| v.as_f64()) else {
                continue;
            };
            let below = fluent.lower.is_some_and(|lo| value < lo);
            let above = fluent.upper.is_some_and(|hi| value > hi);
            if below || above {
                return Err(PlanError::BoundsViolated {
                    step,
                    fluent: fluent.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for PlanningProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} fluents, {} actions, {} constraints)",
            self.model.name,
            self.model.fluents.len(),
            self.model.actions.len(),
            self.constraints.len()
        )
    }
}
