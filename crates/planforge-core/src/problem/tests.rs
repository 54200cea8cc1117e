use super::*;
use crate::constraint::CmpOp;
use crate::error::PlanForgeError;
use crate::feature::Feature;
use crate::value::Value;

fn make_logistics() -> PlanningProblem {
    PlanningProblem::builder("logistics")
        .user_type("place", None)
        .user_type("depot", Some("place"))
        .object("a", "place")
        .object("hub", "depot")
        .object_fluent("at", "place", "a")
        .real_fluent("fuel", 10.0)
        .bounds("fuel", Some(0.0), None)
        .action(
            ActionDef::new("drive", ["a", "hub"])
                .with_precondition(Expr::eq(Expr::fluent("at"), Expr::symbol("a")))
                .with_effect(Effect::assign("at", Expr::symbol("hub")))
                .with_effect(Effect::decrease("fuel", Expr::real(2.5))),
        )
        .goal(Expr::eq(Expr::fluent("at"), Expr::symbol("hub")))
        .build()
        .unwrap()
}

fn domain_error(result: Result<PlanningProblem, PlanForgeError>) -> String {
    match result {
        Err(PlanForgeError::DomainModel(msg)) => msg,
        other => panic!("expected a domain model error, got {:?}", other),
    }
}

#[test]
fn test_action_names_include_arguments() {
    let problem = make_logistics();
    let action = problem.model().action("drive(a,hub)").unwrap();
    assert_eq!(action.schema, "drive");
    assert_eq!(action.args, vec!["a".to_string(), "hub".to_string()]);
    assert!(problem.model().has_schema("drive"));
    assert!(!problem.model().has_schema("fly"));
}

#[test]
fn test_subtyping() {
    let problem = make_logistics();
    let model = problem.model();
    assert!(model.is_subtype("depot", "place"));
    assert!(model.is_subtype("place", "place"));
    assert!(!model.is_subtype("place", "depot"));
}

#[test]
fn test_build_rejects_unknown_references() {
    let msg = domain_error(
        PlanningProblem::builder("p")
            .action(ActionDef::simple("go").with_effect(Effect::assign("x", Expr::int(1))))
            .build(),
    );
    assert!(msg.contains("unknown fluent 'x'"));

    let msg = domain_error(
        PlanningProblem::builder("p")
            .goal(Expr::fluent("missing"))
            .build(),
    );
    assert!(msg.contains("goal"));

    let msg = domain_error(PlanningProblem::builder("p").object("o", "ghost").build());
    assert!(msg.contains("unknown type 'ghost'"));
}

#[test]
fn test_build_rejects_duplicates_and_bad_domains() {
    let msg = domain_error(
        PlanningProblem::builder("p")
            .int_fluent("n", 0)
            .int_fluent("n", 1)
            .build(),
    );
    assert!(msg.contains("duplicate fluent"));

    let msg = domain_error(
        PlanningProblem::builder("p")
            .action(ActionDef::simple("go"))
            .action(ActionDef::simple("go"))
            .build(),
    );
    assert!(msg.contains("duplicate action"));

    let msg = domain_error(
        PlanningProblem::builder("p")
            .bool_fluent("b", false)
            .bounds("b", Some(0.0), None)
            .build(),
    );
    assert!(msg.contains("non-numeric"));

    let msg = domain_error(
        PlanningProblem::builder("p")
            .fluent(FluentDef::new("n", FluentKind::Int), Value::Real(0.5))
            .build(),
    );
    assert!(msg.contains("outside its domain"));

    let msg = domain_error(
        PlanningProblem::builder("p")
            .action(ActionDef::simple("go").with_duration(-1.0))
            .build(),
    );
    assert!(msg.contains("invalid duration"));
}

#[test]
fn test_with_constraint_shares_model() {
    let base = make_logistics();
    let c = Constraint::compare(Feature::PlanLength, CmpOp::Le, Value::Int(1));
    let augmented = base.with_constraint(c.clone());
    let twice = augmented.with_constraint(Constraint::not(c));

    assert!(base.constraints().is_empty());
    assert_eq!(augmented.constraints().len(), 1);
    assert_eq!(twice.constraints().len(), 2);
    assert!(base.same_model(&twice));
    assert_eq!(twice.to_string(), "logistics (2 fluents, 1 actions, 2 constraints)");
}

#[test]
fn test_bounds_are_enforced_on_real_fluents() {
    let problem = make_logistics();
    let plan = Plan::sequential(["drive(a,hub)"]);
    let trace = problem.validate(&plan).unwrap();
    assert_eq!(trace.final_state().get("fuel"), Some(&Value::Real(7.5)));
}

#[test]
fn test_kind_derivation() {
    let kind = make_logistics().kind();
    assert!(kind.has(ProblemFeature::ActionBased));
    assert!(kind.has(ProblemFeature::HierarchicalTyping));
    assert!(kind.has(ProblemFeature::ObjectFluents));
    assert!(kind.has(ProblemFeature::ContinuousNumbers));
    assert!(kind.has(ProblemFeature::BoundedTypes));
    assert!(kind.has(ProblemFeature::DecreaseEffects));
    assert!(kind.has(ProblemFeature::Equalities));
    assert!(!kind.has(ProblemFeature::ConditionalEffects));
    assert!(!kind.has(ProblemFeature::TrajectoryConstraints));

    let constrained = make_logistics().with_constraint(Constraint::True);
    assert!(constrained.kind().has(ProblemFeature::TrajectoryConstraints));
}

#[test]
fn test_kind_subset_and_display() {
    let supported: ProblemKind = [
        ProblemFeature::ActionBased,
        ProblemFeature::NegativeConditions,
    ]
    .into_iter()
    .collect();
    let needed = ProblemKind::new()
        .with(ProblemFeature::ActionBased)
        .with(ProblemFeature::ConditionalEffects);

    assert!(!needed.is_subset_of(&supported));
    let missing: Vec<_> = needed.missing_from(&supported).collect();
    assert_eq!(missing, vec![ProblemFeature::ConditionalEffects]);
    assert_eq!(supported.to_string(), "{ACTION_BASED, NEGATIVE_CONDITIONS}");
}
