//! Tests for planner configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        [bspace-cfg]
        default_tolerance = { type = "bin", width = 2.0 }

        [[bspace-cfg.dims]]
        name = "fuel"
        feature = { type = "resource_usage", fluent = "fuel" }

        [[bspace-cfg.dims]]
        feature = { type = "action_used", schema = "walk" }

        [base-planner-cfg]
        k = 3
        seconds_spent_limit = 60
        heuristic = "hadd"
        weight = 1.5
        verbose = true
    "#;

    let options = PlannerOptions::from_toml_str(toml).unwrap();
    let bspace = options.bspace_cfg.as_ref().unwrap();
    let dims = bspace.dimensions().unwrap();
    assert_eq!(dims.len(), 2);
    assert_eq!(dims[0].effective_name(), "fuel");
    assert_eq!(dims[1].effective_name(), "action_used(walk)");
    assert_eq!(
        bspace.fallback_tolerance(),
        ToleranceConfig::Bin { width: 2.0 }
    );

    let base = &options.base_planner_cfg;
    assert_eq!(base.k, Some(3));
    assert_eq!(base.options.get("heuristic"), Some(&OptionValue::String("hadd".into())));
    assert_eq!(base.options.get("weight"), Some(&OptionValue::Float(1.5)));
    assert_eq!(base.options.get("verbose"), Some(&OptionValue::Bool(true)));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        bspace-cfg:
          dims:
            - name: length
              feature:
                type: plan_length
              tolerance:
                type: exact
        base-planner-cfg:
          k: 2
          timeout_ms: 500
          search: astar
    "#;

    let options = PlannerOptions::from_yaml_str(yaml).unwrap();
    let normalized = options.normalize().unwrap();
    assert_eq!(normalized.plan_count, PlanCount::AtMost(2));
    assert_eq!(normalized.oracle_timeout, Some(Duration::from_millis(500)));
    assert_eq!(normalized.time_limit, None);
    assert_eq!(normalized.options.len(), 1);
    assert_eq!(
        normalized.options.get("search").and_then(|v| v.as_str()),
        Some("astar")
    );
}

#[test]
fn test_missing_or_empty_dims_are_rejected() {
    let missing = PlannerOptions::from_toml_str("[bspace-cfg]\n").unwrap();
    let err = missing.validate().unwrap_err();
    assert!(err.to_string().contains("missing 'dims'"));

    let empty = PlannerOptions::from_toml_str("[bspace-cfg]\ndims = []\n").unwrap();
    let err = empty.validate().unwrap_err();
    assert!(err.to_string().contains("at least one dimension"));

    let none = PlannerOptions::new().with_k(1);
    assert!(matches!(none.normalize(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_invalid_tolerances_and_duplicates() {
    let negative = PlannerOptions::new().with_dimension(
        DimensionConfig::new(FeatureConfig::Makespan)
            .with_tolerance(ToleranceConfig::Epsilon { value: -1.0 }),
    );
    assert!(negative.validate().is_err());

    let zero_bin = PlannerOptions::new().with_dimension(
        DimensionConfig::new(FeatureConfig::Makespan)
            .with_tolerance(ToleranceConfig::Bin { width: 0.0 }),
    );
    assert!(zero_bin.validate().is_err());

    let duplicate = PlannerOptions::new()
        .with_dimension(DimensionConfig::new(FeatureConfig::PlanLength))
        .with_dimension(DimensionConfig::new(FeatureConfig::PlanLength));
    let err = duplicate.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate dimension name 'plan_length'"));

    let zero_timeout = PlannerOptions::new()
        .with_dimension(DimensionConfig::new(FeatureConfig::PlanLength))
        .with_timeout_ms(0);
    assert!(zero_timeout.validate().is_err());
}

#[test]
fn test_plan_count() {
    assert_eq!(PlanCount::from_k(None), PlanCount::Unbounded);
    assert_eq!(PlanCount::from_k(Some(0)), PlanCount::AtMost(0));
    assert_eq!(PlanCount::from_k(Some(-4)), PlanCount::AtMost(0));
    assert!(PlanCount::from_k(Some(-4)).is_zero());
    assert!(PlanCount::AtMost(2).is_reached(2));
    assert!(!PlanCount::AtMost(2).is_reached(1));
    assert!(!PlanCount::Unbounded.is_reached(usize::MAX));
}

#[test]
fn test_builder_defaults() {
    let options = PlannerOptions::new()
        .with_dimension(
            DimensionConfig::new(FeatureConfig::ResourceUsage {
                fluent: "fuel".into(),
            })
            .with_name("fuel"),
        )
        .with_option("seed", OptionValue::Int(7));

    let bspace = options.behaviour_space().unwrap();
    assert_eq!(
        bspace.fallback_tolerance(),
        ToleranceConfig::Epsilon {
            value: DEFAULT_EPSILON
        }
    );
    let normalized = options.normalize().unwrap();
    assert_eq!(normalized.plan_count, PlanCount::Unbounded);
    assert_eq!(normalized.options.get("seed"), Some(&OptionValue::Int(7)));
}
