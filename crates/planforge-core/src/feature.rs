//! Behaviour features: aggregate measurements over an execution trace.

use std::fmt;

use crate::error::EvalError;
use crate::problem::ProblemModel;
use crate::trace::Trace;
use crate::value::Value;

/// An extraction rule computing one scalar or categorical value from a trace.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// Number of steps.
    PlanLength,
    /// Number of steps grounded from `schema`.
    ActionCount { schema: String },
    /// End time of the latest step.
    Makespan,
    /// Value of a fluent in the final state.
    FinalValue { fluent: String },
    /// Total amount by which a numeric fluent decreases over the trajectory.
    ResourceUsage { fluent: String },
    /// Largest value a numeric fluent takes over the trajectory.
    PeakValue { fluent: String },
    /// Whether any step is grounded from `schema`.
    ActionUsed { schema: String },
    /// Schema of the first executed step; `None` for the empty plan.
    FirstAction,
}

impl Feature {
    /// Returns true for features whose values are compared only for equality.
    pub fn is_categorical(&self) -> bool {
        matches!(self, Feature::ActionUsed { .. } | Feature::FirstAction)
    }

    /// Fluent the feature reads, if any.
    pub fn fluent(&self) -> Option<&str> {
        match self {
            Feature::FinalValue { fluent }
            | Feature::ResourceUsage { fluent }
            | Feature::PeakValue { fluent } => Some(fluent),
            _ => None,
        }
    }

    /// Action schema the feature reads, if any.
    pub fn schema(&self) -> Option<&str> {
        match self {
            Feature::ActionCount { schema } | Feature::ActionUsed { schema } => Some(schema),
            _ => None,
        }
    }

    /// Checks that everything the feature references exists in `model`.
    pub fn check(&self, model: &ProblemModel) -> Result<(), String> {
        if let Some(fluent) = self.fluent() {
            let def = model
                .fluent(fluent)
                .ok_or_else(|| format!("{} references unknown fluent '{}'", self, fluent))?;
            let needs_number = matches!(
                self,
                Feature::ResourceUsage { .. } | Feature::PeakValue { .. }
            );
            if needs_number && !def.kind.is_numeric() {
                return Err(format!("{} requires a numeric fluent", self));
            }
        }
        if let Some(schema) = self.schema() {
            if !model.has_schema(schema) {
                return Err(format!("{} references unknown action schema '{}'", self, schema));
            }
        }
        Ok(())
    }

    /// Computes the feature value for `trace`.
    pub fn evaluate(&self, trace: &Trace) -> Result<Value, EvalError> {
        match self {
            Feature::PlanLength => Ok(Value::Int(trace.len() as i64)),

            Feature::ActionCount { schema } => {
                let count = trace.steps.iter().filter(|s| &s.schema == schema).count();
                Ok(Value::Int(count as i64))
            }

            Feature::Makespan => Ok(Value::Real(trace.makespan())),

            Feature::FinalValue { fluent } => trace
                .final_state()
                .get(fluent)
                .cloned()
                .ok_or_else(|| EvalError::UnknownFluent(fluent.clone())),

            Feature::ResourceUsage { fluent } => {
                let values = numeric_trajectory(trace, fluent, "resource_usage")?;
                let mut used = 0.0;
                for pair in values.windows(2) {
                    if pair[1] < pair[0] {
                        used += pair[0] - pair[1];
                    }
                }
                Ok(numeric_result(trace, fluent, used))
            }

            Feature::PeakValue { fluent } => {
                let values = numeric_trajectory(trace, fluent, "peak_value")?;
                let peak = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                Ok(numeric_result(trace, fluent, peak))
            }

            Feature::ActionUsed { schema } => {
                Ok(Value::Bool(trace.steps.iter().any(|s| &s.schema == schema)))
            }

            Feature::FirstAction => Ok(trace
                .steps
                .first()
                .map(|s| Value::symbol(&s.schema))
                .unwrap_or(Value::None)),
        }
    }
}

fn numeric_trajectory(
    trace: &Trace,
    fluent: &str,
    op: &'static str,
) -> Result<Vec<f64>, EvalError> {
    trace
        .trajectory(fluent)
        .map(|v| {
            let v = v?;
            v.as_f64().ok_or_else(|| EvalError::TypeMismatch {
                op,
                detail: format!("fluent '{}' holds {}", fluent, v.type_name()),
            })
        })
        .collect()
}

// Integer trajectories yield integer features so signatures compare exactly.
fn numeric_result(trace: &Trace, fluent: &str, value: f64) -> Value {
    let all_int = trace
        .trajectory(fluent)
        .all(|v| matches!(v, Ok(Value::Int(_))));
    if all_int {
        Value::Int(value as i64)
    } else {
        Value::Real(value)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::PlanLength => write!(f, "plan_length"),
            Feature::ActionCount { schema } => write!(f, "action_count({})", schema),
            Feature::Makespan => write!(f, "makespan"),
            Feature::FinalValue { fluent } => write!(f, "final_value({})", fluent),
            Feature::ResourceUsage { fluent } => write!(f, "resource_usage({})", fluent),
            Feature::PeakValue { fluent } => write!(f, "peak_value({})", fluent),
            Feature::ActionUsed { schema } => write!(f, "action_used({})", schema),
            Feature::FirstAction => write!(f, "first_action"),
        }
    }
}
