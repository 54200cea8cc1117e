//! Builder module for constructing behaviour spaces from configuration
//!
//! This module provides the wiring between configuration types and
//! the behaviour space the loop describes plans with.

use planforge_config::{BehaviourSpaceConfig, DimensionConfig, ToleranceConfig};

use crate::behaviour::{BehaviourSpace, Dimension, Tolerance};
use crate::error::DiversifyError;

/// Builder for constructing behaviour spaces from configuration.
pub struct BehaviourSpaceBuilder;

impl BehaviourSpaceBuilder {
    /// Builds a behaviour space, validating the configuration first.
    ///
    /// Dimensions without a tolerance use the configured default, or
    /// `Epsilon(DEFAULT_EPSILON)` when none is given.
    pub fn build(config: &BehaviourSpaceConfig) -> Result<BehaviourSpace, DiversifyError> {
        config.validate()?;
        let fallback = config.fallback_tolerance();
        let dims = config
            .dimensions()?
            .iter()
            .map(|dim| Self::dimension(dim, &fallback))
            .collect();
        BehaviourSpace::new(dims)
    }

    /// Builds one dimension.
    pub fn dimension(config: &DimensionConfig, fallback: &ToleranceConfig) -> Dimension {
        let tolerance = config.tolerance.as_ref().unwrap_or(fallback);
        Dimension::new(
            config.effective_name(),
            config.feature.to_feature(),
            Self::tolerance(tolerance),
        )
    }

    pub fn tolerance(config: &ToleranceConfig) -> Tolerance {
        match *config {
            ToleranceConfig::Exact => Tolerance::Exact,
            ToleranceConfig::Epsilon { value } => Tolerance::Epsilon(value),
            ToleranceConfig::Bin { width } => Tolerance::Bin(width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_config::{FeatureConfig, DEFAULT_EPSILON};
    use planforge_core::Feature;

    fn fuel() -> DimensionConfig {
        DimensionConfig::new(FeatureConfig::ResourceUsage {
            fluent: "fuel".into(),
        })
    }

    #[test]
    fn test_builder_applies_default_epsilon() {
        let config = BehaviourSpaceConfig {
            dims: Some(vec![fuel()]),
            default_tolerance: None,
        };
        let space = BehaviourSpaceBuilder::build(&config).unwrap();
        let dim = &space.dimensions()[0];
        assert_eq!(dim.name(), "resource_usage(fuel)");
        assert_eq!(dim.tolerance(), Tolerance::Epsilon(DEFAULT_EPSILON));
    }

    #[test]
    fn test_builder_prefers_dimension_tolerance() {
        let config = BehaviourSpaceConfig {
            dims: Some(vec![
                fuel()
                    .with_name("fuel")
                    .with_tolerance(ToleranceConfig::Bin { width: 2.0 }),
                DimensionConfig::new(FeatureConfig::PlanLength),
                DimensionConfig::new(FeatureConfig::FirstAction)
                    .with_tolerance(ToleranceConfig::Epsilon { value: 3.0 }),
            ]),
            default_tolerance: Some(ToleranceConfig::Exact),
        };
        let space = BehaviourSpaceBuilder::build(&config).unwrap();
        let dims = space.dimensions();

        assert_eq!(dims[0].name(), "fuel");
        assert_eq!(dims[0].tolerance(), Tolerance::Bin(2.0));
        assert_eq!(dims[1].feature(), &Feature::PlanLength);
        assert_eq!(dims[1].tolerance(), Tolerance::Exact);
        // Categorical features ignore the configured tolerance.
        assert_eq!(dims[2].tolerance(), Tolerance::Exact);
    }

    #[test]
    fn test_builder_rejects_missing_and_empty_dims() {
        let missing = BehaviourSpaceConfig::default();
        let err = BehaviourSpaceBuilder::build(&missing).unwrap_err();
        assert!(matches!(err, DiversifyError::Configuration(_)));
        assert!(err.to_string().contains("missing 'dims'"));

        let empty = BehaviourSpaceConfig {
            dims: Some(Vec::new()),
            default_tolerance: None,
        };
        let err = BehaviourSpaceBuilder::build(&empty).unwrap_err();
        assert!(err.to_string().contains("at least one dimension"));
    }

    #[test]
    fn test_builder_rejects_invalid_tolerance() {
        let config = BehaviourSpaceConfig {
            dims: Some(vec![fuel().with_tolerance(ToleranceConfig::Bin { width: 0.0 })]),
            default_tolerance: None,
        };
        assert!(matches!(
            BehaviourSpaceBuilder::build(&config),
            Err(DiversifyError::Configuration(_))
        ));
    }
}
