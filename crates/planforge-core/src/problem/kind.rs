//! Problem kinds: the set of modelling features a problem uses.

use std::collections::BTreeSet;
use std::fmt;

use super::{EffectKind, FluentKind, PlanningProblem};
use crate::expr::Expr;

/// A modelling feature a problem may use and a planner may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProblemFeature {
    ActionBased,
    GeneralNumericPlanning,
    FlatTyping,
    HierarchicalTyping,
    ContinuousNumbers,
    DiscreteNumbers,
    BoundedTypes,
    NumericFluents,
    ObjectFluents,
    NegativeConditions,
    DisjunctiveConditions,
    Equalities,
    ExistentialConditions,
    UniversalConditions,
    ConditionalEffects,
    IncreaseEffects,
    DecreaseEffects,
    FluentsInNumericAssignments,
    TrajectoryConstraints,
}

impl ProblemFeature {
    /// Upper-snake-case token of the feature, e.g. `CONDITIONAL_EFFECTS`.
    pub fn token(&self) -> &'static str {
        match self {
            ProblemFeature::ActionBased => "ACTION_BASED",
            ProblemFeature::GeneralNumericPlanning => "GENERAL_NUMERIC_PLANNING",
            ProblemFeature::FlatTyping => "FLAT_TYPING",
            ProblemFeature::HierarchicalTyping => "HIERARCHICAL_TYPING",
            ProblemFeature::ContinuousNumbers => "CONTINUOUS_NUMBERS",
            ProblemFeature::DiscreteNumbers => "DISCRETE_NUMBERS",
            ProblemFeature::BoundedTypes => "BOUNDED_TYPES",
            ProblemFeature::NumericFluents => "NUMERIC_FLUENTS",
            ProblemFeature::ObjectFluents => "OBJECT_FLUENTS",
            ProblemFeature::NegativeConditions => "NEGATIVE_CONDITIONS",
            ProblemFeature::DisjunctiveConditions => "DISJUNCTIVE_CONDITIONS",
            ProblemFeature::Equalities => "EQUALITIES",
            ProblemFeature::ExistentialConditions => "EXISTENTIAL_CONDITIONS",
            ProblemFeature::UniversalConditions => "UNIVERSAL_CONDITIONS",
            ProblemFeature::ConditionalEffects => "CONDITIONAL_EFFECTS",
            ProblemFeature::IncreaseEffects => "INCREASE_EFFECTS",
            ProblemFeature::DecreaseEffects => "DECREASE_EFFECTS",
            ProblemFeature::FluentsInNumericAssignments => "FLUENTS_IN_NUMERIC_ASSIGNMENTS",
            ProblemFeature::TrajectoryConstraints => "TRAJECTORY_CONSTRAINTS",
        }
    }
}

impl fmt::Display for ProblemFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A set of [`ProblemFeature`]s.
///
/// A planner supports a problem when the problem's kind is a subset of the
/// planner's supported kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemKind {
    features: BTreeSet<ProblemFeature>,
}

impl ProblemKind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: ProblemFeature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn set(&mut self, feature: ProblemFeature) {
        self.features.insert(feature);
    }

    pub fn has(&self, feature: ProblemFeature) -> bool {
        self.features.contains(&feature)
    }

    pub fn is_subset_of(&self, other: &ProblemKind) -> bool {
        self.features.is_subset(&other.features)
    }

    /// Features of `self` missing from `other`.
    pub fn missing_from<'a>(
        &'a self,
        other: &'a ProblemKind,
    ) -> impl Iterator<Item = ProblemFeature> + 'a {
        self.features.difference(&other.features).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ProblemFeature> + '_ {
        self.features.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Derives the kind of a problem from its model and constraints.
    pub fn of(problem: &PlanningProblem) -> Self {
        let model = problem.model();
        let mut kind = ProblemKind::new().with(ProblemFeature::ActionBased);

        if !model.types.is_empty() {
            if model.types.iter().any(|t| t.parent.is_some()) {
                kind.set(ProblemFeature::HierarchicalTyping);
            } else {
                kind.set(ProblemFeature::FlatTyping);
            }
        }

        for fluent in &model.fluents {
            match &fluent.kind {
                FluentKind::Int => {
                    kind.set(ProblemFeature::NumericFluents);
                    kind.set(ProblemFeature::DiscreteNumbers);
                }
                FluentKind::Real => {
                    kind.set(ProblemFeature::NumericFluents);
                    kind.set(ProblemFeature::ContinuousNumbers);
                }
                FluentKind::Object { .. } => kind.set(ProblemFeature::ObjectFluents),
                FluentKind::Bool => {}
            }
            if fluent.is_bounded() {
                kind.set(ProblemFeature::BoundedTypes);
            }
        }
        if kind.has(ProblemFeature::NumericFluents) {
            kind.set(ProblemFeature::GeneralNumericPlanning);
        }

        let mut conditions: Vec<&Expr> = vec![&model.goal];
        for action in &model.actions {
            conditions.push(&action.precondition);
            for effect in &action.effects {
                if let Some(cond) = &effect.condition {
                    kind.set(ProblemFeature::ConditionalEffects);
                    conditions.push(cond);
                }
                match &effect.kind {
                    EffectKind::Increase(_) => kind.set(ProblemFeature::IncreaseEffects),
                    EffectKind::Decrease(_) => kind.set(ProblemFeature::DecreaseEffects),
                    EffectKind::Assign(_) => {}
                }
                let numeric_target = model
                    .fluent(&effect.fluent)
                    .is_some_and(|f| f.kind.is_numeric());
                if numeric_target && !effect.kind.expr().fluents().is_empty() {
                    kind.set(ProblemFeature::FluentsInNumericAssignments);
                }
            }
        }
        for cond in conditions {
            if cond.any(|e| matches!(e, Expr::Not(_))) {
                kind.set(ProblemFeature::NegativeConditions);
            }
            if cond.any(|e| matches!(e, Expr::Or(_) | Expr::Implies(..))) {
                kind.set(ProblemFeature::DisjunctiveConditions);
            }
            if cond.any(|e| matches!(e, Expr::Eq(..) | Expr::Ne(..))) {
                kind.set(ProblemFeature::Equalities);
            }
        }

        if !problem.constraints().is_empty() {
            kind.set(ProblemFeature::TrajectoryConstraints);
        }
        kind
    }
}

impl FromIterator<ProblemFeature> for ProblemKind {
    fn from_iter<I: IntoIterator<Item = ProblemFeature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.features.iter().map(|p| p.token()).collect();
        write!(f, "{{{}}}", tokens.join(", "))
    }
}
