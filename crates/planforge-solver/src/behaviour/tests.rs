//! Tests for behaviour spaces and description.

use super::*;
use planforge_core::{Plan, PlanningProblem};
use planforge_test::{counter_problem, delivery_problem, DELIVERY_FUEL_USAGES};

fn fuel_and_first_action() -> BehaviourSpace {
    BehaviourSpace::new(vec![
        Dimension::new(
            "fuel",
            Feature::ResourceUsage {
                fluent: "fuel".into(),
            },
            Tolerance::Epsilon(0.5),
        ),
        Dimension::of(Feature::FirstAction, Tolerance::Bin(10.0)),
    ])
    .unwrap()
}

#[test]
fn test_describe_delivery_plans() {
    let problem = delivery_problem();
    let space = fuel_and_first_action();

    for (action, fuel) in ["drive_fast", "drive_slow", "walk"]
        .into_iter()
        .zip(DELIVERY_FUEL_USAGES)
    {
        let sig = space.describe(&problem, &Plan::sequential([action])).unwrap();
        assert_eq!(sig.values(), &[Value::Int(fuel), Value::symbol(action)]);
    }
}

#[test]
fn test_describe_is_idempotent() {
    let problem = counter_problem(2);
    let space = BehaviourSpace::new(vec![
        Dimension::of(Feature::PlanLength, Tolerance::Exact),
        Dimension::of(Feature::Makespan, Tolerance::Epsilon(1e-6)),
        Dimension::of(
            Feature::PeakValue {
                fluent: "n".into(),
            },
            Tolerance::Bin(2.0),
        ),
    ])
    .unwrap();
    let plan = Plan::sequential(["inc", "inc", "dec", "inc"]);

    let first = describe(&space, &problem, &plan).unwrap();
    let second = describe(&space, &problem, &plan).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), "(4, 4, 2)");
}

#[test]
fn test_describe_rejects_unknown_fluent() {
    let problem = counter_problem(1);
    let space = BehaviourSpace::new(vec![Dimension::new(
        "water",
        Feature::ResourceUsage {
            fluent: "water".into(),
        },
        Tolerance::Exact,
    )])
    .unwrap();

    let err = space
        .describe(&problem, &Plan::sequential(["inc"]))
        .unwrap_err();
    assert!(matches!(
        err,
        DiversifyError::InvalidPlanForDescriptor { dimension: Some(ref d), .. } if d == "water"
    ));
}

#[test]
fn test_describe_rejects_unknown_action() {
    let problem: PlanningProblem = counter_problem(1);
    let space = BehaviourSpace::new(vec![Dimension::of(Feature::PlanLength, Tolerance::Exact)])
        .unwrap();

    let err = space
        .describe(&problem, &Plan::sequential(["teleport"]))
        .unwrap_err();
    assert!(matches!(
        err,
        DiversifyError::InvalidPlanForDescriptor {
            dimension: None,
            ..
        }
    ));
}

#[test]
fn test_space_validation() {
    assert!(matches!(
        BehaviourSpace::new(vec![]),
        Err(DiversifyError::Configuration(_))
    ));
    let dup = BehaviourSpace::new(vec![
        Dimension::of(Feature::PlanLength, Tolerance::Exact),
        Dimension::of(Feature::PlanLength, Tolerance::Bin(2.0)),
    ]);
    assert!(matches!(dup, Err(DiversifyError::Configuration(_))));
}

#[test]
fn test_categorical_dimensions_are_exact() {
    let dim = Dimension::of(
        Feature::ActionUsed {
            schema: "walk".into(),
        },
        Tolerance::Epsilon(5.0),
    );
    assert_eq!(dim.tolerance(), Tolerance::Exact);
    assert_eq!(dim.name(), "action_used(walk)");
}

#[test]
fn test_tolerance_matching() {
    let eps = Tolerance::Epsilon(0.5);
    assert!(eps.matches(&Value::Int(2), &Value::Real(2.5)));
    assert!(eps.matches(&Value::Int(2), &Value::Real(1.5)));
    assert!(!eps.matches(&Value::Int(2), &Value::Real(2.6)));

    let bin = Tolerance::Bin(2.0);
    assert!(bin.matches(&Value::Int(2), &Value::Int(3)));
    assert!(!bin.matches(&Value::Int(3), &Value::Int(4)));
    assert!(bin.matches(&Value::Real(-0.5), &Value::Real(-2.0)));

    assert!(Tolerance::Exact.matches(&Value::Int(2), &Value::Real(2.0)));
    assert!(!Tolerance::Exact.matches(&Value::Int(2), &Value::Int(3)));
    assert!(!Tolerance::Exact.matches(&Value::Real(0.0), &Value::Real(1e-20)));
    assert!(!Tolerance::Exact.matches(&Value::Int(2), &Value::Real(2.0 + 1e-12)));
    assert!(Tolerance::Exact.matches(&Value::Real(0.0), &Value::Real(-0.0)));
    assert!(eps.matches(&Value::symbol("walk"), &Value::symbol("walk")));
    assert!(!eps.matches(&Value::Int(1), &Value::Bool(true)));
}

#[test]
fn test_region_agrees_with_matching() {
    let problem = counter_problem(2);
    let feature = Feature::PlanLength;
    let plans = [
        Plan::sequential(["inc", "inc"]),
        Plan::sequential(["inc", "inc", "dec"]),
        Plan::sequential(["inc", "inc", "dec", "inc"]),
        Plan::sequential(["inc", "dec", "inc", "dec", "inc", "inc"]),
    ];
    let tolerances = [
        Tolerance::Exact,
        Tolerance::Epsilon(1.0),
        Tolerance::Bin(2.0),
        Tolerance::Bin(3.0),
    ];
    let centre = Value::Int(3);

    for tolerance in tolerances {
        let region = tolerance.region(&feature, &centre);
        for plan in &plans {
            let trace = problem.simulate(plan).unwrap();
            let value = feature.evaluate(&trace).unwrap();
            assert_eq!(
                region.evaluate(&trace).unwrap(),
                tolerance.matches(&centre, &value),
                "{} around {} for {}",
                tolerance,
                centre,
                value
            );
        }
    }
}

#[test]
fn test_same_behaviour() {
    let space = fuel_and_first_action();
    let a = BehaviourSignature::new([Value::Int(4), Value::symbol("drive_fast")]);
    let b = BehaviourSignature::new([Value::Real(4.4), Value::symbol("drive_fast")]);
    let c = BehaviourSignature::new([Value::Real(4.4), Value::symbol("walk")]);
    assert!(space.same_behaviour(&a, &b));
    assert!(!space.same_behaviour(&a, &c));
    assert!(!space.same_behaviour(&a, &BehaviourSignature::new([Value::Int(4)])));
}
