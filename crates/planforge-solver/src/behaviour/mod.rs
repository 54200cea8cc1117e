//! Behaviour spaces and signatures.
//!
//! A [`BehaviourSpace`] is an ordered list of [`Dimension`]s. Describing a
//! plan applies each dimension's feature to the plan's execution trace and
//! yields a [`BehaviourSignature`]; two signatures denote the same behaviour
//! when every pair of values lies within the dimension's [`Tolerance`].

mod descriptor;

#[cfg(test)]
mod tests;

pub use descriptor::describe;

use std::collections::HashSet;
use std::fmt;

use planforge_core::{CmpOp, Constraint, Feature, Value};
use smallvec::SmallVec;

use crate::error::DiversifyError;

/// Comparison policy for values of one dimension.
///
/// Every policy defines a *region* around a centre value. A candidate value
/// matches the centre when it falls inside the region, and the region is
/// what the forbidding constraint excludes. Non-numeric values always use
/// exact equality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Equal values only. Reals compare exactly; an integer matches a real
    /// only when both are the same number.
    Exact,
    /// Closed interval `[v - e, v + e]`.
    Epsilon(f64),
    /// Half-open bin `[floor(v / w) * w, (floor(v / w) + 1) * w)`.
    Bin(f64),
}

/// Numeric bounds of a tolerance region.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bounds {
    Closed(f64, f64),
    HalfOpen(f64, f64),
}

impl Tolerance {
    fn bounds(&self, centre: &Value) -> Option<Bounds> {
        let v = centre.as_f64()?;
        match *self {
            Tolerance::Exact => None,
            Tolerance::Epsilon(e) => Some(Bounds::Closed(v - e, v + e)),
            Tolerance::Bin(w) => {
                let lo = (v / w).floor() * w;
                Some(Bounds::HalfOpen(lo, lo + w))
            }
        }
    }

    /// Returns true if `candidate` lies in the region around `centre`.
    pub fn matches(&self, centre: &Value, candidate: &Value) -> bool {
        match (self.bounds(centre), candidate.as_f64()) {
            (Some(Bounds::Closed(lo, hi)), Some(x)) => x >= lo && x <= hi,
            (Some(Bounds::HalfOpen(lo, hi)), Some(x)) => x >= lo && x < hi,
            (Some(_), None) => false,
            (None, _) => centre == candidate,
        }
    }

    /// Builds the constraint "`feature` lies in the region around `centre`".
    pub fn region(&self, feature: &Feature, centre: &Value) -> Constraint {
        let cmp = |op, bound: f64| Constraint::compare(feature.clone(), op, Value::Real(bound));
        match self.bounds(centre) {
            Some(Bounds::Closed(lo, hi)) => {
                Constraint::and([cmp(CmpOp::Ge, lo), cmp(CmpOp::Le, hi)])
            }
            Some(Bounds::HalfOpen(lo, hi)) => {
                Constraint::and([cmp(CmpOp::Ge, lo), cmp(CmpOp::Lt, hi)])
            }
            None => Constraint::compare(feature.clone(), CmpOp::Eq, centre.clone()),
        }
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tolerance::Exact => write!(f, "exact"),
            Tolerance::Epsilon(e) => write!(f, "epsilon({})", e),
            Tolerance::Bin(w) => write!(f, "bin({})", w),
        }
    }
}

/// A named feature with its comparison policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    name: String,
    feature: Feature,
    tolerance: Tolerance,
}

impl Dimension {
    /// Creates a dimension. Categorical features always use
    /// [`Tolerance::Exact`], whatever `tolerance` says.
    pub fn new(name: impl Into<String>, feature: Feature, tolerance: Tolerance) -> Self {
        let tolerance = if feature.is_categorical() {
            Tolerance::Exact
        } else {
            tolerance
        };
        Self {
            name: name.into(),
            feature,
            tolerance,
        }
    }

    /// Creates a dimension named after its feature.
    pub fn of(feature: Feature, tolerance: Tolerance) -> Self {
        Self::new(feature.to_string(), feature, tolerance)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }
}

/// Feature vector of one plan, one value per dimension in space order.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviourSignature {
    values: SmallVec<[Value; 4]>,
}

impl BehaviourSignature {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for BehaviourSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

impl FromIterator<Value> for BehaviourSignature {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// An ordered, non-empty set of uniquely named dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviourSpace {
    dims: Vec<Dimension>,
}

impl BehaviourSpace {
    /// Creates a space, rejecting empty dimension lists and duplicate names.
    pub fn new(dims: Vec<Dimension>) -> Result<Self, DiversifyError> {
        if dims.is_empty() {
            return Err(DiversifyError::invalid_config(
                "behaviour space needs at least one dimension",
            ));
        }
        let mut seen = HashSet::with_capacity(dims.len());
        for dim in &dims {
            if !seen.insert(dim.name.as_str()) {
                return Err(DiversifyError::invalid_config(format!(
                    "duplicate dimension name '{}'",
                    dim.name
                )));
            }
        }
        Ok(Self { dims })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Returns true if `candidate` falls inside the region around `centre`
    /// on every dimension.
    pub fn same_behaviour(
        &self,
        centre: &BehaviourSignature,
        candidate: &BehaviourSignature,
    ) -> bool {
        centre.len() == self.dims.len()
            && candidate.len() == self.dims.len()
            && self
                .dims
                .iter()
                .zip(centre.values().iter().zip(candidate.values()))
                .all(|(dim, (c, x))| dim.tolerance.matches(c, x))
    }
}
