//! Integration tests for the FBIPlanner plugin.
//!
//! These tests drive the whole stack: configuration parsing, behaviour space
//! construction, the diversification loop and the enumerating test oracle.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use planforge::prelude::*;
use planforge::{
    Constraint, DiversifyError, Expr, Feature, OracleOutcome, PlanGenerationStatus, ProblemFeature,
    ProblemKind, Value,
};
use planforge_core::{ActionDef, Effect};
use planforge_test::{delivery_problem, EnumeratingOracle, ScriptedOracle};
use tokio::sync::mpsc;

/// Rover on three locations: drive a→c directly, drive a→b→c, or fly a→c.
fn rover_problem() -> PlanningProblem {
    let at = |loc: &str| Expr::eq(Expr::fluent("at"), Expr::symbol(loc));
    let go = |schema: &str, from: &str, to: &str| {
        ActionDef::new(schema, [from, to])
            .with_precondition(at(from))
            .with_effect(Effect::assign("at", Expr::symbol(to)))
    };

    PlanningProblem::builder("rover")
        .user_type("location", None)
        .object("a", "location")
        .object("b", "location")
        .object("c", "location")
        .object_fluent("at", "location", "a")
        .action(go("drive", "a", "b"))
        .action(go("drive", "b", "c"))
        .action(go("drive", "a", "c"))
        .action(go("fly", "a", "c"))
        .goal(at("c"))
        .build()
        .unwrap()
}

const ROVER_TOML: &str = r#"
[bspace-cfg]
dims = [
    { name = "first", feature = { type = "first_action" } },
    { name = "drives", feature = { type = "action_count", schema = "drive" }, tolerance = { type = "exact" } },
]

[base-planner-cfg]
k = 10
max_depth = 3
"#;

#[test]
fn test_rover_behaviours_from_toml() {
    let options = PlannerOptions::from_toml_str(ROVER_TOML).unwrap();
    let planner = FbiPlanner::from_options(options).unwrap();
    let problem = rover_problem();
    assert!(FbiPlanner::supports(&problem.kind()));

    let out = planner.solve(&problem, Arc::new(EnumeratingOracle::new(1)));

    assert_eq!(out.results.len(), 3);
    assert!(out.is_solved());
    assert!(out.results.iter().all(|r| r.engine_name == "FBIPlanner"));
    assert_eq!(out.run.status, RunStatus::Exhausted);
    assert_eq!(out.log.len(), 4);

    let mut signatures: Vec<String> = out.run.signatures.iter().map(|s| s.to_string()).collect();
    signatures.sort();
    assert_eq!(signatures, vec!["(drive, 1)", "(drive, 2)", "(fly, 0)"]);
    for plan in out.plans() {
        assert!(problem.is_solution(plan));
    }
}

#[test]
fn test_categorical_dimension_alone_merges_drives() {
    let options = PlannerOptions::new()
        .with_dimension(DimensionConfig::new(FeatureConfig::FirstAction))
        .with_k(10);
    let planner = FbiPlanner::from_options(options).unwrap();

    let out = planner.solve(&rover_problem(), Arc::new(EnumeratingOracle::new(3)));

    assert_eq!(out.results.len(), 2);
    let firsts: Vec<&Value> = out.run.signatures.iter().filter_map(|s| s.get(0)).collect();
    assert!(firsts.contains(&&Value::symbol("drive")));
    assert!(firsts.contains(&&Value::symbol("fly")));
}

#[test]
fn test_yaml_options_with_bins() {
    let yaml = r#"
bspace-cfg:
  dims:
    - feature: { type: makespan }
      tolerance: { type: bin, width: 3.0 }
base-planner-cfg:
  k: 5
"#;
    let planner = FbiPlanner::from_options(PlannerOptions::from_yaml_str(yaml).unwrap()).unwrap();

    let out = planner.solve(&delivery_problem(), Arc::new(EnumeratingOracle::new(3)));

    // Makespans 1 and 2 share the bin [0, 3); 4 lies in [3, 6).
    assert_eq!(out.results.len(), 2);
}

#[test]
fn test_invalid_options_fail_eagerly() {
    let missing = PlannerOptions::from_toml_str("[base-planner-cfg]\nk = 3\n").unwrap();
    assert!(matches!(
        FbiPlanner::from_options(missing),
        Err(DiversifyError::Configuration(_))
    ));

    let empty = PlannerOptions::from_toml_str("[bspace-cfg]\ndims = []\n").unwrap();
    assert!(FbiPlanner::from_options(empty).is_err());
}

#[test]
fn test_no_plan_reports_unsolvable_incompletely() {
    let options = PlannerOptions::new()
        .with_dimension(DimensionConfig::new(FeatureConfig::PlanLength))
        .with_k(3);
    let planner = FbiPlanner::from_options(options).unwrap();

    let out = planner.solve(&delivery_problem(), Arc::new(ScriptedOracle::new([])));

    assert_eq!(out.results.len(), 1);
    assert_eq!(
        out.results[0].status,
        PlanGenerationStatus::UnsolvableIncompletely
    );
    assert!(out.results[0].plan.is_none());
    assert!(!out.is_solved());
    assert_eq!(out.log.len(), 1);
}

#[test]
fn test_timeout_keeps_earlier_plans() {
    let options = PlannerOptions::new()
        .with_dimension(DimensionConfig::new(FeatureConfig::ResourceUsage {
            fluent: "fuel".into(),
        }))
        .with_k(5);
    let planner = FbiPlanner::from_options(options).unwrap();
    let oracle = ScriptedOracle::new([
        OracleOutcome::Solved(Plan::sequential(["walk"])),
        OracleOutcome::Timeout,
    ]);

    let out = planner.solve(&delivery_problem(), Arc::new(oracle));

    assert_eq!(out.results.len(), 1);
    assert_eq!(out.run.tags(), vec!["found", "error: timeout"]);
    assert_eq!(out.run.status, RunStatus::Aborted);
}

#[test]
fn test_supported_kind() {
    let kind = FbiPlanner::supported_kind();
    assert!(kind.has(ProblemFeature::GeneralNumericPlanning));
    assert!(kind.has(ProblemFeature::ObjectFluents));
    assert!(!kind.has(ProblemFeature::TrajectoryConstraints));
    assert!(!kind.has(ProblemFeature::ExistentialConditions));
    assert!(!kind.has(ProblemFeature::UniversalConditions));
    let quantified: ProblemKind = [ProblemFeature::ActionBased, ProblemFeature::UniversalConditions]
        .into_iter()
        .collect();
    assert!(!FbiPlanner::supports(&quantified));

    let planner = FbiPlanner::from_options(
        PlannerOptions::new().with_dimension(DimensionConfig::new(FeatureConfig::PlanLength)),
    )
    .unwrap();
    assert_eq!(planner.name(), "FBIPlanner");

    let constrained = delivery_problem().with_constraint(Constraint::not(Constraint::compare(
        Feature::PlanLength,
        planforge_core::CmpOp::Eq,
        Value::Int(1),
    )));
    assert!(!FbiPlanner::supports(&constrained.kind()));
}

#[test]
fn test_cancelled_planner_calls_nothing() {
    let options = PlannerOptions::new()
        .with_dimension(DimensionConfig::new(FeatureConfig::PlanLength))
        .with_k(3);
    let planner = FbiPlanner::from_options(options)
        .unwrap()
        .with_cancel_flag(Arc::new(AtomicBool::new(true)));
    let oracle = Arc::new(ScriptedOracle::new([OracleOutcome::Solved(Plan::sequential([
        "walk",
    ]))]));

    let out = planner.solve(&delivery_problem(), oracle.clone());

    assert_eq!(oracle.call_count(), 0);
    assert_eq!(out.run.status, RunStatus::Cancelled);
    assert_eq!(
        out.results[0].status,
        PlanGenerationStatus::UnsolvableIncompletely
    );
}

#[tokio::test]
async fn test_plans_stream_to_async_consumer() {
    let options = PlannerOptions::new()
        .with_dimension(DimensionConfig::new(FeatureConfig::ResourceUsage {
            fluent: "fuel".into(),
        }))
        .with_k(5);
    let planner = FbiPlanner::from_options(options).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let handle = tokio::task::spawn_blocking(move || {
        planner.solve_with_channel(
            &delivery_problem(),
            Arc::new(EnumeratingOracle::new(3)),
            sender,
        )
    });

    let mut received = Vec::new();
    while let Some((plan, signature)) = receiver.recv().await {
        received.push((plan, signature));
    }
    let out = handle.await.unwrap();

    assert_eq!(received.len(), 3);
    let plans: Vec<&Plan> = out.plans().collect();
    let streamed: Vec<&Plan> = received.iter().map(|(p, _)| p).collect();
    assert_eq!(plans, streamed);
}
