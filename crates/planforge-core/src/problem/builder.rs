//! Fluent construction and validation of problem models.

use std::collections::HashMap;

use super::{ActionDef, FluentDef, FluentKind, ObjectDef, PlanningProblem, ProblemModel, TypeDef};
use crate::error::PlanForgeError;
use crate::eval::State;
use crate::expr::Expr;
use crate::value::Value;

/// Builds a [`PlanningProblem`], validating names and references on `build`.
///
/// # Example
///
/// ```
/// use planforge_core::{ActionDef, Effect, Expr, PlanningProblem, Value};
///
/// let problem = PlanningProblem::builder("refuel")
///     .int_fluent("fuel", 0)
///     .action(
///         ActionDef::simple("refuel")
///             .with_effect(Effect::increase("fuel", Expr::int(5))),
///     )
///     .goal(Expr::ge(Expr::fluent("fuel"), Expr::int(5)))
///     .build()
///     .unwrap();
///
/// assert_eq!(problem.initial_state().get("fuel"), Some(&Value::Int(0)));
/// ```
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    name: String,
    types: Vec<TypeDef>,
    objects: Vec<ObjectDef>,
    fluents: Vec<FluentDef>,
    initial: Vec<(String, Value)>,
    actions: Vec<ActionDef>,
    goal: Expr,
}

impl ProblemBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            objects: Vec::new(),
            fluents: Vec::new(),
            initial: Vec::new(),
            actions: Vec::new(),
            goal: Expr::bool(true),
        }
    }

    pub fn user_type(mut self, name: impl Into<String>, parent: Option<&str>) -> Self {
        self.types.push(TypeDef {
            name: name.into(),
            parent: parent.map(str::to_string),
        });
        self
    }

    pub fn object(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.objects.push(ObjectDef {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    /// Adds a fluent with its initial value.
    pub fn fluent(mut self, def: FluentDef, initial: Value) -> Self {
        self.initial.push((def.name.clone(), initial));
        self.fluents.push(def);
        self
    }

    pub fn bool_fluent(self, name: impl Into<String>, initial: bool) -> Self {
        self.fluent(FluentDef::new(name, FluentKind::Bool), Value::Bool(initial))
    }

    pub fn int_fluent(self, name: impl Into<String>, initial: i64) -> Self {
        self.fluent(FluentDef::new(name, FluentKind::Int), Value::Int(initial))
    }

    pub fn real_fluent(self, name: impl Into<String>, initial: f64) -> Self {
        self.fluent(FluentDef::new(name, FluentKind::Real), Value::Real(initial))
    }

    pub fn object_fluent(
        self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        initial: &str,
    ) -> Self {
        let kind = FluentKind::Object {
            type_name: type_name.into(),
        };
        self.fluent(FluentDef::new(name, kind), Value::symbol(initial))
    }

    /// Bounds a previously declared numeric fluent.
    pub fn bounds(mut self, fluent: &str, lower: Option<f64>, upper: Option<f64>) -> Self {
        if let Some(def) = self.fluents.iter_mut().find(|f| f.name == fluent) {
            def.lower = lower;
            def.upper = upper;
        }
        self
    }

    pub fn action(mut self, action: ActionDef) -> Self {
        self.actions.push(action);
        self
    }

    pub fn goal(mut self, goal: Expr) -> Self {
        self.goal = goal;
        self
    }

    /// Validates the model and produces an unconstrained problem.
    pub fn build(self) -> Result<PlanningProblem, PlanForgeError> {
        for t in &self.types {
            if let Some(parent) = &t.parent {
                if !self.types.iter().any(|d| &d.name == parent) {
                    return Err(invalid(format!(
                        "type '{}' derives from unknown type '{}'",
                        t.name, parent
                    )));
                }
            }
        }
        for o in &self.objects {
            if !self.types.iter().any(|d| d.name == o.type_name) {
                return Err(invalid(format!(
                    "object '{}' has unknown type '{}'",
                    o.name, o.type_name
                )));
            }
        }

        let mut fluent_index = HashMap::with_capacity(self.fluents.len());
        for (i, f) in self.fluents.iter().enumerate() {
            if fluent_index.insert(f.name.clone(), i).is_some() {
                return Err(invalid(format!("duplicate fluent '{}'", f.name)));
            }
            if f.is_bounded() && !f.kind.is_numeric() {
                return Err(invalid(format!("non-numeric fluent '{}' has bounds", f.name)));
            }
        }

        let mut action_index = HashMap::with_capacity(self.actions.len());
        for (i, a) in self.actions.iter().enumerate() {
            if action_index.insert(a.name.clone(), i).is_some() {
                return Err(invalid(format!("duplicate action '{}'", a.name)));
            }
            if !a.duration.is_finite() || a.duration < 0.0 {
                return Err(invalid(format!(
                    "action '{}' has invalid duration {}",
                    a.name, a.duration
                )));
            }
            check_fluents(&a.precondition, &fluent_index, &a.name)?;
            for effect in &a.effects {
                if !fluent_index.contains_key(&effect.fluent) {
                    return Err(invalid(format!(
                        "action '{}' affects unknown fluent '{}'",
                        a.name, effect.fluent
                    )));
                }
                if let Some(cond) = &effect.condition {
                    check_fluents(cond, &fluent_index, &a.name)?;
                }
                check_fluents(effect.kind.expr(), &fluent_index, &a.name)?;
            }
        }
        check_fluents(&self.goal, &fluent_index, "goal")?;

        let initial_state: State = self.initial.into_iter().collect();
        let model = ProblemModel {
            name: self.name,
            types: self.types,
            objects: self.objects,
            fluents: self.fluents,
            actions: self.actions,
            initial_state,
            goal: self.goal,
            fluent_index,
            action_index,
        };

        for f in &model.fluents {
            let value = model.initial_state.get(&f.name);
            let ok = match (&f.kind, value) {
                (FluentKind::Bool, Some(Value::Bool(_))) => true,
                (FluentKind::Int, Some(Value::Int(_))) => true,
                (FluentKind::Real, Some(v)) => v.is_numeric(),
                (FluentKind::Object { type_name }, Some(Value::Symbol(obj))) => model
                    .object(obj)
                    .is_some_and(|o| model.is_subtype(&o.type_name, type_name)),
                _ => false,
            };
            if !ok {
                return Err(invalid(format!(
                    "fluent '{}' has an initial value outside its domain",
                    f.name
                )));
            }
        }

        Ok(PlanningProblem::new(model))
    }
}

fn check_fluents(
    expr: &Expr,
    index: &HashMap<String, usize>,
    owner: &str,
) -> Result<(), PlanForgeError> {
    match expr.fluents().into_iter().find(|f| !index.contains_key(*f)) {
        Some(missing) => Err(invalid(format!(
            "{} references unknown fluent '{}'",
            owner, missing
        ))),
        None => Ok(()),
    }
}

fn invalid(msg: String) -> PlanForgeError {
    PlanForgeError::DomainModel(msg)
}
