//! Expression evaluation against a planning state.

mod compare;


pub use compare::{compare_values, values_equal};

use std::collections::BTreeMap;

use crate::error::EvalError;
use crate::expr::Expr;
use crate::value::Value;

/// Assignment of values to the grounded fluents of a problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    values: BTreeMap<String, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a fluent, if the fluent exists.
    pub fn get(&self, fluent: &str) -> Option<&Value> {
        self.values.get(fluent)
    }

    /// Sets the value of a fluent.
    pub fn set(&mut self, fluent: impl Into<String>, value: Value) {
        self.values.insert(fluent.into(), value);
    }

    pub fn contains(&self, fluent: &str) -> bool {
        self.values.contains_key(fluent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for State {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Evaluates an expression in the given state.
pub fn eval_expr(expr: &Expr, state: &State) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        Expr::Fluent(name) => state
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownFluent(name.clone())),

        Expr::Eq(left, right) => {
            let l = eval_expr(left, state)?;
            let r = eval_expr(right, state)?;
            Ok(Value::Bool(values_equal(&l, &r)))
        }

        Expr::Ne(left, right) => {
            let l = eval_expr(left, state)?;
            let r = eval_expr(right, state)?;
            Ok(Value::Bool(!values_equal(&l, &r)))
        }

        Expr::Lt(left, right) => ordering(left, right, state, "<", |o| o.is_lt()),
        Expr::Le(left, right) => ordering(left, right, state, "<=", |o| o.is_le()),
        Expr::Gt(left, right) => ordering(left, right, state, ">", |o| o.is_gt()),
        Expr::Ge(left, right) => ordering(left, right, state, ">=", |o| o.is_ge()),

        Expr::And(items) => {
            for item in items {
                if !eval_bool(item, state, "and")? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }

        Expr::Or(items) => {
            for item in items {
                if eval_bool(item, state, "or")? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }

        Expr::Not(inner) => Ok(Value::Bool(!eval_bool(inner, state, "not")?)),

        Expr::Implies(premise, conclusion) => {
            if eval_bool(premise, state, "implies")? {
                Ok(Value::Bool(eval_bool(conclusion, state, "implies")?))
            } else {
                Ok(Value::Bool(true))
            }
        }

        Expr::Add(left, right) => {
            arithmetic(left, right, state, "+", i64::checked_add, |a, b| a + b)
        }
        Expr::Sub(left, right) => {
            arithmetic(left, right, state, "-", i64::checked_sub, |a, b| a - b)
        }
        Expr::Mul(left, right) => {
            arithmetic(left, right, state, "*", i64::checked_mul, |a, b| a * b)
        }

        Expr::Div(left, right) => {
            let l = eval_expr(left, state)?;
            let r = eval_expr(right, state)?;
            match (&l, &r) {
                (Value::Int(_), Value::Int(0)) => Err(EvalError::DivisionByZero),
                (Value::Int(a), Value::Int(b)) if a.checked_rem(*b) == Some(0) => {
                    Ok(Value::Int(a / b))
                }
                _ => {
                    let (a, b) = numeric_pair(&l, &r, "/")?;
                    if b == 0.0 {
                        Err(EvalError::DivisionByZero)
                    } else {
                        Ok(Value::Real(a / b))
                    }
                }
            }
        }

        Expr::Neg(inner) => match eval_expr(inner, state)? {
            Value::Int(n) => Ok(n
                .checked_neg()
                .map_or(Value::Real(-(n as f64)), Value::Int)),
            Value::Real(n) => Ok(Value::Real(-n)),
            other => Err(mismatch("neg", &other, &Value::None)),
        },

        Expr::Abs(inner) => match eval_expr(inner, state)? {
            Value::Int(n) => Ok(n
                .checked_abs()
                .map_or(Value::Real((n as f64).abs()), Value::Int)),
            Value::Real(n) => Ok(Value::Real(n.abs())),
            other => Err(mismatch("abs", &other, &Value::None)),
        },

        Expr::Min(left, right) => {
            let l = eval_expr(left, state)?;
            let r = eval_expr(right, state)?;
            match compare_values(&l, &r) {
                Some(o) if o.is_le() => Ok(l),
                Some(_) => Ok(r),
                None => Err(mismatch("min", &l, &r)),
            }
        }

        Expr::Max(left, right) => {
            let l = eval_expr(left, state)?;
            let r = eval_expr(right, state)?;
            match compare_values(&l, &r) {
                Some(o) if o.is_ge() => Ok(l),
                Some(_) => Ok(r),
                None => Err(mismatch("max", &l, &r)),
            }
        }

        Expr::If {
            cond,
            then_expr,
            else_expr,
        } => {
            if eval_bool(cond, state, "if")? {
                eval_expr(then_expr, state)
            } else {
                eval_expr(else_expr, state)
            }
        }
    }
}

/// Evaluates an expression that must produce a boolean.
pub fn eval_bool(expr: &Expr, state: &State, op: &'static str) -> Result<bool, EvalError> {
    let value = eval_expr(expr, state)?;
    value.as_bool().ok_or_else(|| EvalError::TypeMismatch {
        op,
        detail: format!("expected bool, found {}", value.type_name()),
    })
}

fn ordering(
    left: &Expr,
    right: &Expr,
    state: &State,
    op: &'static str,
    test: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, EvalError> {
    let l = eval_expr(left, state)?;
    let r = eval_expr(right, state)?;
    match compare_values(&l, &r) {
        Some(o) => Ok(Value::Bool(test(o))),
        None => Err(mismatch(op, &l, &r)),
    }
}

fn arithmetic(
    left: &Expr,
    right: &Expr,
    state: &State,
    op: &'static str,
    int_op: fn(i64, i64) -> Option<i64>,
    real_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let l = eval_expr(left, state)?;
    let r = eval_expr(right, state)?;
    if let (Value::Int(a), Value::Int(b)) = (&l, &r) {
        if let Some(v) = int_op(*a, *b) {
            return Ok(Value::Int(v));
        }
    }
    let (a, b) = numeric_pair(&l, &r, op)?;
    Ok(Value::Real(real_op(a, b)))
}

fn numeric_pair(l: &Value, r: &Value, op: &'static str) -> Result<(f64, f64), EvalError> {
    match (l.as_f64(), r.as_f64()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(op, l, r)),
    }
}

fn mismatch(op: &'static str, l: &Value, r: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op,
        detail: format!("{} and {}", l.type_name(), r.type_name()),
    }
}
