//! Toy planning problems.

use planforge_core::{ActionDef, Effect, Expr, PlanningProblem};

/// Fuel used by `drive_fast`, `drive_slow` and `walk`, in that order.
pub const DELIVERY_FUEL_USAGES: [i64; 3] = [4, 2, 0];

/// A parcel delivery with exactly three solutions and three fuel-usage
/// behaviours.
///
/// Every action requires the parcel not to be delivered yet and delivers it,
/// so each solution is a single step: `drive_fast` (4 fuel), `drive_slow`
/// (2 fuel, twice as long) or `walk` (no fuel, four times as long).
pub fn delivery_problem() -> PlanningProblem {
    let pending = Expr::not(Expr::fluent("delivered"));
    let deliver = Effect::assign("delivered", Expr::bool(true));

    PlanningProblem::builder("delivery")
        .int_fluent("fuel", 10)
        .bool_fluent("delivered", false)
        .bounds("fuel", Some(0.0), None)
        .action(
            ActionDef::simple("drive_fast")
                .with_precondition(pending.clone())
                .with_effect(deliver.clone())
                .with_effect(Effect::decrease("fuel", Expr::int(DELIVERY_FUEL_USAGES[0]))),
        )
        .action(
            ActionDef::simple("drive_slow")
                .with_precondition(pending.clone())
                .with_duration(2.0)
                .with_effect(deliver.clone())
                .with_effect(Effect::decrease("fuel", Expr::int(DELIVERY_FUEL_USAGES[1]))),
        )
        .action(
            ActionDef::simple("walk")
                .with_precondition(pending)
                .with_duration(4.0)
                .with_effect(deliver),
        )
        .goal(Expr::fluent("delivered"))
        .build()
        .expect("delivery fixture is well-formed")
}

/// A counter that must end at exactly `target`, using `inc` and `dec`.
///
/// Solutions exist for every length `target + 2 * i`, so plan length gives an
/// unbounded number of behaviours.
pub fn counter_problem(target: i64) -> PlanningProblem {
    PlanningProblem::builder("counter")
        .int_fluent("n", 0)
        .action(ActionDef::simple("inc").with_effect(Effect::increase("n", Expr::int(1))))
        .action(
            ActionDef::simple("dec")
                .with_precondition(Expr::gt(Expr::fluent("n"), Expr::int(0)))
                .with_effect(Effect::decrease("n", Expr::int(1))),
        )
        .goal(Expr::eq(Expr::fluent("n"), Expr::int(target)))
        .build()
        .expect("counter fixture is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::{Plan, Value};

    #[test]
    fn test_delivery_solutions() {
        let problem = delivery_problem();
        for action in ["drive_fast", "drive_slow", "walk"] {
            assert!(problem.is_solution(&Plan::sequential([action])));
        }
        assert!(!problem.is_solution(&Plan::sequential(["walk", "walk"])));
        assert!(!problem.is_solution(&Plan::default()));
    }

    #[test]
    fn test_counter_solutions() {
        let problem = counter_problem(2);
        assert!(problem.is_solution(&Plan::sequential(["inc", "inc"])));
        assert!(problem.is_solution(&Plan::sequential(["inc", "dec", "inc", "inc"])));
        assert!(!problem.is_solution(&Plan::sequential(["dec", "inc", "inc"])));
        let trace = problem.simulate(&Plan::sequential(["inc"])).unwrap();
        assert_eq!(trace.final_state().get("n"), Some(&Value::Int(1)));
    }
}
