//! Runtime values held by fluents and produced by expressions and features.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A value of a fluent, an expression or a behaviour feature.
#[derive(Debug, Clone)]
pub enum Value {
    /// No value (e.g. the first action of an empty plan).
    None,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Real(f64),
    /// Name of an object or action schema.
    Symbol(Arc<str>),
}

/// Structural equality. Reals compare exactly (with `0.0 == -0.0` and
/// `NaN == NaN`); closeness belongs to the tolerance of a behaviour dimension.
/// An integer equals a real only when the real is exactly that integer.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => real_key(*a) == real_key(*b),
            (Value::Int(a), Value::Real(b)) | (Value::Real(b), Value::Int(a)) => {
                int_is_real(*a, *b)
            }
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::None => 0u8.hash(state),
            Value::Bool(v) => {
                1u8.hash(state);
                v.hash(state);
            }
            // Ints and integral reals compare equal, so they hash alike.
            Value::Int(v) => {
                2u8.hash(state);
                real_key(*v as f64).hash(state);
            }
            Value::Real(v) => {
                2u8.hash(state);
                real_key(*v).hash(state);
            }
            Value::Symbol(v) => {
                3u8.hash(state);
                v.hash(state);
            }
        }
    }
}

/// Bit pattern with the two zeros and all NaNs collapsed.
fn real_key(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

fn int_is_real(i: i64, r: f64) -> bool {
    // `as i64` saturates, so the round trip rejects reals outside the range.
    r.fract() == 0.0 && i as f64 == r && r as i64 == i
}

impl Value {
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Value::Symbol(Arc::from(name.as_ref()))
    }

    /// Returns true if this value is None.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns true for `Int` and `Real`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Real(_))
    }

    /// Attempts to extract a bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an i64 value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Attempts to extract a symbol name.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Symbol(_) => "symbol",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Symbol(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::symbol(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mixed_numeric_equality() {
        assert_eq!(Value::Int(3), Value::Real(3.0));
        assert_ne!(Value::Int(3), Value::Real(3.5));
        assert_ne!(Value::Int(1), Value::Bool(true));
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(Value::Int(2));
        assert!(set.contains(&Value::Real(2.0)));
        assert!(!set.contains(&Value::symbol("2")));

        set.insert(Value::Real(0.0));
        assert_eq!(Value::Real(0.0), Value::Real(-0.0));
        assert!(set.contains(&Value::Real(-0.0)));
        assert!(set.contains(&Value::Int(0)));

        set.insert(Value::Real(f64::NAN));
        assert!(set.contains(&Value::Real(-f64::NAN)));
    }

    #[test]
    fn test_reals_compare_exactly() {
        assert_ne!(Value::Real(0.0), Value::Real(1e-20));
        assert_ne!(Value::Real(0.1 + 0.2), Value::Real(0.3));
        assert_eq!(Value::Real(2.5), Value::Real(2.5));

        let set: HashSet<Value> = [Value::Real(0.0)].into_iter().collect();
        assert!(!set.contains(&Value::Real(1e-20)));
    }

    #[test]
    fn test_int_equals_only_its_exact_real() {
        assert_eq!(Value::Int(i64::MAX), Value::Real(i64::MAX as f64));
        assert_ne!(Value::Int(i64::MAX - 1), Value::Real(i64::MAX as f64));
        assert_ne!(Value::Int(i64::MAX), Value::Real(f64::INFINITY));
        assert_ne!(Value::Int(0), Value::Real(f64::NAN));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::symbol("drive").to_string(), "drive");
        assert_eq!(Value::Real(1.5).to_string(), "1.5");
        assert_eq!(Value::None.to_string(), "none");
    }
}
