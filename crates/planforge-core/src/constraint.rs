//! Global constraints over behaviour features of a whole plan.
//!
//! A [`Constraint`] is attached to a [`PlanningProblem`](crate::PlanningProblem)
//! and restricts which plans count as solutions, independently of the
//! problem's goal. Constraints are evaluated on the plan's execution trace.

use std::fmt;

use crate::error::EvalError;
use crate::eval::compare_values;
use crate::feature::Feature;
use crate::trace::Trace;
use crate::value::Value;

/// Comparison operator between a feature value and a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A boolean formula over feature comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    True,
    Compare {
        feature: Feature,
        op: CmpOp,
        value: Value,
    },
    Not(Box<Constraint>),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
}

impl Constraint {
    pub fn compare(feature: Feature, op: CmpOp, value: Value) -> Self {
        Constraint::Compare { feature, op, value }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Constraint) -> Self {
        Constraint::Not(Box::new(inner))
    }

    pub fn and(operands: impl IntoIterator<Item = Constraint>) -> Self {
        Constraint::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = Constraint>) -> Self {
        Constraint::Or(operands.into_iter().collect())
    }

    /// Evaluates the constraint on a trace.
    ///
    /// Equality is defined by [`Value`]'s `PartialEq`; ordering comparisons
    /// on unordered values are errors.
    pub fn evaluate(&self, trace: &Trace) -> Result<bool, EvalError> {
        match self {
            Constraint::True => Ok(true),
            Constraint::Compare { feature, op, value } => {
                let actual = feature.evaluate(trace)?;
                compare(&actual, *op, value)
            }
            Constraint::Not(inner) => Ok(!inner.evaluate(trace)?),
            Constraint::And(items) => {
                for item in items {
                    if !item.evaluate(trace)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Constraint::Or(items) => {
                for item in items {
                    if item.evaluate(trace)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Features referenced anywhere in the formula.
    pub fn features(&self) -> Vec<&Feature> {
        let mut out = Vec::new();
        self.collect_features(&mut out);
        out
    }

    fn collect_features<'a>(&'a self, out: &mut Vec<&'a Feature>) {
        match self {
            Constraint::True => {}
            Constraint::Compare { feature, .. } => out.push(feature),
            Constraint::Not(inner) => inner.collect_features(out),
            Constraint::And(items) | Constraint::Or(items) => {
                for item in items {
                    item.collect_features(out);
                }
            }
        }
    }
}

fn compare(actual: &Value, op: CmpOp, expected: &Value) -> Result<bool, EvalError> {
    let ordered = |test: fn(std::cmp::Ordering) -> bool| {
        compare_values(actual, expected)
            .map(test)
            .ok_or_else(|| EvalError::TypeMismatch {
                op: op.symbol(),
                detail: format!("{} and {}", actual.type_name(), expected.type_name()),
            })
    };
    match op {
        CmpOp::Eq => Ok(actual == expected),
        CmpOp::Ne => Ok(actual != expected),
        CmpOp::Lt => ordered(std::cmp::Ordering::is_lt),
        CmpOp::Le => ordered(std::cmp::Ordering::is_le),
        CmpOp::Gt => ordered(std::cmp::Ordering::is_gt),
        CmpOp::Ge => ordered(std::cmp::Ordering::is_ge),
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::True => write!(f, "true"),
            Constraint::Compare { feature, op, value } => {
                write!(f, "{} {} {}", feature, op.symbol(), value)
            }
            Constraint::Not(inner) => write!(f, "not({})", inner),
            Constraint::And(items) => write_joined(f, "and", items),
            Constraint::Or(items) => write_joined(f, "or", items),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, op: &str, items: &[Constraint]) -> fmt::Result {
    write!(f, "{}(", op)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::plan::Plan;
    use crate::problem::{ActionDef, Effect, PlanningProblem};

    fn make_trace(steps: usize) -> Trace {
        let problem = PlanningProblem::builder("tick")
            .int_fluent("t", 0)
            .action(ActionDef::simple("tick").with_effect(Effect::increase("t", Expr::int(1))))
            .build()
            .unwrap();
        problem
            .simulate(&Plan::sequential(std::iter::repeat("tick").take(steps)))
            .unwrap()
    }

    #[test]
    fn test_compare_and_connectives() {
        let trace = make_trace(2);
        let len_is_2 = Constraint::compare(Feature::PlanLength, CmpOp::Eq, Value::Int(2));
        let len_lt_2 = Constraint::compare(Feature::PlanLength, CmpOp::Lt, Value::Int(2));

        assert!(len_is_2.evaluate(&trace).unwrap());
        assert!(!len_lt_2.evaluate(&trace).unwrap());
        assert!(Constraint::not(len_lt_2.clone()).evaluate(&trace).unwrap());
        assert!(Constraint::or([len_lt_2.clone(), len_is_2.clone()])
            .evaluate(&trace)
            .unwrap());
        assert!(!Constraint::and([len_lt_2, len_is_2]).evaluate(&trace).unwrap());
        assert!(Constraint::and([]).evaluate(&trace).unwrap());
    }

    #[test]
    fn test_ordering_on_symbols_is_an_error() {
        let trace = make_trace(1);
        let c = Constraint::compare(Feature::FirstAction, CmpOp::Lt, Value::Int(1));
        assert!(matches!(
            c.evaluate(&trace),
            Err(EvalError::TypeMismatch { op: "<", .. })
        ));
    }

    #[test]
    fn test_display() {
        let c = Constraint::not(Constraint::and([
            Constraint::compare(Feature::PlanLength, CmpOp::Eq, Value::Int(2)),
            Constraint::compare(Feature::Makespan, CmpOp::Le, Value::Real(1.5)),
        ]));
        assert_eq!(c.to_string(), "not(and(plan_length == 2, makespan <= 1.5))");
        assert_eq!(c.features().len(), 2);
    }
}
