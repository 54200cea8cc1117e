//! Value comparison functions.

use std::cmp::Ordering;

use crate::value::Value;

/// Checks if two values are equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    a == b
}

/// Compares two values; `None` when they are not ordered.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Real(x), Value::Real(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Real(y)) => (*x as f64).partial_cmp(y),
        (Value::Real(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Symbol(x), Value::Symbol(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
