//! Plan simulation and execution traces.

use std::cmp::Ordering;

use crate::error::{EvalError, SimulationError};
use crate::eval::{eval_bool, eval_expr, State};
use crate::expr::Expr;
use crate::plan::Plan;
use crate::problem::{EffectKind, ProblemModel};
use crate::value::Value;

/// A plan step placed on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedStep {
    /// Position of the step in the original plan.
    pub index: usize,
    pub action: String,
    pub schema: String,
    pub start: f64,
    pub end: f64,
}

/// Execution trace of a plan: timed steps in execution order and the state
/// before the first step and after every step.
///
/// Invariant: `states.len() == steps.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub steps: Vec<TimedStep>,
    pub states: Vec<State>,
}

impl Trace {
    pub fn initial_state(&self) -> &State {
        &self.states[0]
    }

    pub fn final_state(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    /// End time of the latest step, `0.0` for the empty plan.
    pub fn makespan(&self) -> f64 {
        self.steps.iter().map(|s| s.end).fold(0.0, f64::max)
    }

    /// Trajectory of one fluent across all states.
    pub fn trajectory<'a>(
        &'a self,
        fluent: &'a str,
    ) -> impl Iterator<Item = Result<&'a Value, EvalError>> + 'a {
        self.states.iter().map(move |s| {
            s.get(fluent)
                .ok_or_else(|| EvalError::UnknownFluent(fluent.to_string()))
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Simulates `plan` on `model` without checking preconditions.
pub(crate) fn simulate(model: &ProblemModel, plan: &Plan) -> Result<Trace, SimulationError> {
    let mut steps = Vec::with_capacity(plan.len());
    let mut cursor = 0.0_f64;

    for (index, step) in plan.steps.iter().enumerate() {
        let action = model
            .action(&step.action)
            .ok_or_else(|| SimulationError::UnknownAction {
                step: index,
                action: step.action.clone(),
            })?;
        let start = step.start.unwrap_or(cursor);
        if !start.is_finite() || start < 0.0 {
            return Err(SimulationError::InvalidStart { step: index, start });
        }
        let end = start + action.duration;
        cursor = cursor.max(end);
        steps.push(TimedStep {
            index,
            action: action.name.clone(),
            schema: action.schema.clone(),
            start,
            end,
        });
    }

    // Stable: concurrent steps keep plan order.
    steps.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

    let mut states = Vec::with_capacity(steps.len() + 1);
    states.push(model.initial_state.clone());

    for step in &steps {
        let pre = &states[states.len() - 1];
        let next = apply(model, step, pre)?;
        states.push(next);
    }

    Ok(Trace { steps, states })
}

// Effects of one step are simultaneous: every condition and right-hand side
// is evaluated in the pre-state before any assignment happens.
fn apply(model: &ProblemModel, step: &TimedStep, pre: &State) -> Result<State, SimulationError> {
    let action = model
        .action(&step.action)
        .ok_or_else(|| SimulationError::UnknownAction {
            step: step.index,
            action: step.action.clone(),
        })?;
    let wrap = |source: EvalError| SimulationError::Effect {
        step: step.index,
        action: step.action.clone(),
        source,
    };

    let mut updates = Vec::with_capacity(action.effects.len());
    for effect in &action.effects {
        if let Some(cond) = &effect.condition {
            if !eval_bool(cond, pre, "when").map_err(wrap)? {
                continue;
            }
        }
        if !pre.contains(&effect.fluent) {
            return Err(SimulationError::UnknownEffectTarget {
                step: step.index,
                fluent: effect.fluent.clone(),
            });
        }
        let target = Expr::fluent(effect.fluent.as_str());
        let value = match &effect.kind {
            EffectKind::Assign(e) => eval_expr(e, pre),
            EffectKind::Increase(e) => eval_expr(&(target + e.clone()), pre),
            EffectKind::Decrease(e) => eval_expr(&(target - e.clone()), pre),
        }
        .map_err(wrap)?;
        updates.push((effect.fluent.clone(), value));
    }

    let mut next = pre.clone();
    for (fluent, value) in updates {
        next.set(fluent, value);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{CmpOp, Constraint};
    use crate::error::PlanError;
    use crate::feature::Feature;
    use crate::plan::PlanStep;
    use crate::problem::{ActionDef, Effect, PlanningProblem};

    fn make_problem() -> PlanningProblem {
        PlanningProblem::builder("counter")
            .int_fluent("n", 0)
            .bool_fluent("done", false)
            .bounds("n", Some(0.0), Some(3.0))
            .action(
                ActionDef::simple("inc")
                    .with_precondition(Expr::not(Expr::fluent("done")))
                    .with_effect(Effect::increase("n", Expr::int(1))),
            )
            .action(
                ActionDef::simple("finish")
                    .with_duration(2.0)
                    .with_effect(Effect::assign("done", Expr::bool(true)))
                    .with_effect(
                        Effect::decrease("n", Expr::int(1))
                            .when(Expr::gt(Expr::fluent("n"), Expr::int(2))),
                    ),
            )
            .goal(Expr::fluent("done"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_simulate_records_trajectory() {
        let problem = make_problem();
        let plan = Plan::sequential(["inc", "inc", "finish"]);
        let trace = problem.simulate(&plan).unwrap();

        assert_eq!(trace.states.len(), 4);
        let ns: Vec<i64> = trace
            .trajectory("n")
            .map(|v| v.unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ns, vec![0, 1, 2, 2]);
        assert_eq!(trace.makespan(), 4.0);
        assert_eq!(trace.steps[2].start, 2.0);
    }

    #[test]
    fn test_conditional_effect_uses_pre_state() {
        let problem = make_problem();
        let plan = Plan::sequential(["inc", "inc", "inc", "finish"]);
        let trace = problem.simulate(&plan).unwrap();
        assert_eq!(trace.final_state().get("n"), Some(&Value::Int(2)));
        assert_eq!(trace.final_state().get("done"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_explicit_start_times_reorder_steps() {
        let problem = make_problem();
        let plan = Plan::new(vec![PlanStep::at("finish", 5.0), PlanStep::at("inc", 0.0)]);
        let trace = problem.simulate(&plan).unwrap();
        assert_eq!(trace.steps[0].action, "inc");
        assert_eq!(trace.steps[0].index, 1);
        assert_eq!(trace.makespan(), 7.0);
    }

    #[test]
    fn test_unknown_action() {
        let problem = make_problem();
        let err = problem.simulate(&Plan::sequential(["jump"])).unwrap_err();
        assert_eq!(
            err,
            SimulationError::UnknownAction {
                step: 0,
                action: "jump".into()
            }
        );
    }

    #[test]
    fn test_validate_checks_preconditions_goal_and_bounds() {
        let problem = make_problem();

        assert!(problem.validate(&Plan::sequential(["inc", "finish"])).is_ok());
        assert_eq!(
            problem.validate(&Plan::sequential(["inc"])).unwrap_err(),
            PlanError::GoalNotReached
        );
        assert!(matches!(
            problem.validate(&Plan::sequential(["finish", "inc"])),
            Err(PlanError::PreconditionViolated { step: 1, .. })
        ));
        assert!(matches!(
            problem.validate(&Plan::sequential(["inc", "inc", "inc", "inc", "finish"])),
            Err(PlanError::BoundsViolated { step: 3, .. })
        ));
    }

    #[test]
    fn test_validate_checks_global_constraints() {
        let problem = make_problem().with_constraint(Constraint::compare(
            Feature::PlanLength,
            CmpOp::Ge,
            Value::Int(3),
        ));

        assert_eq!(
            problem.validate(&Plan::sequential(["inc", "finish"])).unwrap_err(),
            PlanError::ConstraintViolated { index: 0 }
        );
        assert!(problem.is_solution(&Plan::sequential(["inc", "inc", "finish"])));
    }
}
