//! Forbidding-constraint synthesis.
//!
//! Each accepted plan's signature marks a region of the behaviour space as
//! taken. The forbidding constraint is the conjunction of the negated regions,
//! so adding a signature only ever appends a conjunct: the constraint after
//! `i + 1` signatures implies the constraint after `i`.

use planforge_core::Constraint;
use tracing::debug;

use crate::behaviour::{BehaviourSignature, BehaviourSpace, Dimension};

/// Constraint satisfied exactly by plans whose signature falls inside the
/// region around `signature` on every dimension.
pub fn region(dims: &[Dimension], signature: &BehaviourSignature) -> Constraint {
    Constraint::and(
        dims.iter()
            .zip(signature.values())
            .map(|(dim, value)| dim.tolerance().region(dim.feature(), value)),
    )
}

/// Builds `AND_i NOT(region(sig_i))` over `forbidden`.
///
/// An empty list yields [`Constraint::True`].
pub fn synthesize(forbidden: &[BehaviourSignature], dims: &[Dimension]) -> Constraint {
    if forbidden.is_empty() {
        return Constraint::True;
    }
    Constraint::and(
        forbidden
            .iter()
            .map(|sig| Constraint::not(region(dims, sig))),
    )
}

/// Append-only set of forbidden behaviour regions.
#[derive(Debug, Clone)]
pub struct ForbiddenRegions {
    space: BehaviourSpace,
    signatures: Vec<BehaviourSignature>,
}

impl ForbiddenRegions {
    pub fn new(space: &BehaviourSpace) -> Self {
        Self {
            space: space.clone(),
            signatures: Vec::new(),
        }
    }

    pub fn signatures(&self) -> &[BehaviourSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Returns true if `signature` falls inside an already forbidden region.
    pub fn is_forbidden(&self, signature: &BehaviourSignature) -> bool {
        self.signatures
            .iter()
            .any(|centre| self.space.same_behaviour(centre, signature))
    }

    /// Forbids the region around `signature`.
    pub fn insert(&mut self, signature: BehaviourSignature) {
        debug!(
            event = "constraint_extended",
            signature = %signature,
            forbidden = self.signatures.len() + 1,
        );
        self.signatures.push(signature);
    }

    /// The current forbidding constraint.
    pub fn constraint(&self) -> Constraint {
        synthesize(&self.signatures, self.space.dimensions())
    }
}
