//! End-to-end sizing scenarios solved with HiGHS
use float_cmp::assert_approx_eq;
use itertools::Itertools;
use solar_sizing::component::{ComponentClass, ComponentType, OutputDistribution, PanelType};
use solar_sizing::diagnostics::SuspectedConstraint;
use solar_sizing::input::load_parameters;
use solar_sizing::model::{VariableKind, build_model};
use solar_sizing::parameters::ParameterSet;
use solar_sizing::report::Report;
use solar_sizing::sizing::{SizingOutcome, run_sizing};
use solar_sizing::solver::{HighsSolver, Solver, SolverOutcome};
use solar_sizing::units::{Dimensionless, Energy, Money, MoneyPerEnergy};
use strum::IntoEnumIterator;

fn load_demo(name: &str) -> ParameterSet {
    let path = format!("{}/demos/{name}", env!("CARGO_MANIFEST_DIR"));
    load_parameters(path).unwrap()
}

fn size(parameters: &ParameterSet) -> SizingOutcome {
    run_sizing(parameters, &HighsSolver::default()).unwrap()
}

fn expect_sized(outcome: SizingOutcome) -> Report {
    match outcome {
        SizingOutcome::Sized(report) => report,
        other => panic!("Expected a sized system, got {other:?}"),
    }
}

/// The solver's objective uses unrounded values, so compare with a relative tolerance
fn assert_objective_matches_cost(report: &Report) {
    let total_cost = report.economics.total_cost.value();
    assert_approx_eq!(
        f64,
        report.objective_value,
        total_cost,
        epsilon = 1e-6 * total_cost.max(1.0)
    );
}

#[test]
fn test_single_type_sizing() {
    let report = expect_sized(size(&load_demo("single_type")));

    let quantities = ComponentClass::iter()
        .map(|class| report.component(class).quantity)
        .collect_vec();
    assert_eq!(quantities, [4, 13, 4]);

    let panel = report.component(ComponentClass::Panel);
    assert_eq!(panel.lifetime_unit_count, 5);
    assert_approx_eq!(Money, panel.capital_cost, Money(20000.0));
    assert_approx_eq!(Money, report.economics.total_cost, Money(105000.0), epsilon = 1e-6);
    assert_approx_eq!(Energy, report.required_storage, Energy(64.0), epsilon = 1e-9);
}

#[test]
fn test_objective_equals_total_cost() {
    for name in ["simple", "single_type"] {
        let report = expect_sized(size(&load_demo(name)));
        assert_objective_matches_cost(&report);
    }
}

#[test]
fn test_budget_too_small() {
    let mut parameters = load_demo("single_type");
    parameters.project.total_budget = Money(100000.0);

    let SizingOutcome::Infeasible(report) = size(&parameters) else {
        panic!("Expected an infeasible outcome");
    };
    assert_eq!(report.suspected_constraint, SuspectedConstraint::Budget);
    assert_approx_eq!(Money, report.budget_shortfall, Money(5000.0), epsilon = 1e-6);
}

#[test]
fn test_zero_demand() {
    let mut parameters = load_demo("simple");
    parameters.project.daily_energy_demand = Energy(0.0);

    let report = expect_sized(size(&parameters));
    assert!(report.components.iter().all(|c| c.quantity == 0));
    assert_eq!(report.economics.cost_per_kwh, MoneyPerEnergy(f64::INFINITY));
    assert_eq!(report.economics.breakeven_years, f64::INFINITY);
}

#[test]
fn test_one_type_selected_per_class() {
    let parameters = load_demo("simple");
    let model = build_model(&parameters).unwrap();
    let SolverOutcome::Optimal(solution) = HighsSolver::default().solve(&model.program) else {
        panic!("Expected an optimal solution");
    };

    for class in ComponentClass::iter() {
        let selections = model
            .variables
            .iter_class(class, VariableKind::Selection)
            .map(|(_, var)| solution.value(var).round())
            .collect_vec();
        assert_eq!(selections.iter().sum::<f64>(), 1.0, "class {class}");

        // With positive demand, units are installed for the selected type and no other
        for (type_index, selected) in selections.into_iter().enumerate() {
            let var = model
                .variables
                .get(class, type_index, VariableKind::Quantity);
            let quantity = solution.value(var).round();
            assert_eq!(quantity > 0.0, selected == 1.0, "{class} type {type_index}");
        }
    }
}

#[test]
fn test_budget_monotonicity() {
    let mut parameters = load_demo("simple");
    let mut previous_cost: Option<Money> = None;
    for budget in [700000.0, 750000.0, 1e6, 1e7] {
        parameters.project.total_budget = Money(budget);
        match size(&parameters) {
            SizingOutcome::Sized(report) => {
                let cost = report.economics.total_cost;
                assert!(cost <= Money(budget));
                if let Some(previous) = previous_cost {
                    assert!(cost.value() <= previous.value() + 1e-6);
                }
                previous_cost = Some(cost);
            }
            SizingOutcome::Infeasible(_) => {
                assert!(
                    previous_cost.is_none(),
                    "Budget {budget} is infeasible but a smaller one was not"
                );
            }
            SizingOutcome::SolverFailure { solver_status } => {
                panic!("Solver failed: {solver_status}")
            }
        }
    }

    assert_approx_eq!(
        Money,
        previous_cost.unwrap(),
        Money(729000.0),
        epsilon = 1e-6
    );
}

#[test]
fn test_confidence_monotonicity() {
    let mut parameters = load_demo("single_type");
    parameters.project.total_budget = Money(1e7);

    let storage = [0.5, 0.7, 0.9, 0.99]
        .into_iter()
        .map(|confidence_level| {
            parameters.project.confidence_level = Dimensionless(confidence_level);
            expect_sized(size(&parameters)).required_storage
        })
        .collect_vec();

    // At the median the requirement is the mean output deficit
    assert_approx_eq!(Energy, storage[0], Energy(64.0), epsilon = 1e-9);
    for (lower, higher) in storage.iter().tuple_windows() {
        assert!(higher >= lower);
    }
}

fn panel(id: &str, unit_cost: f64, capacity: f64) -> PanelType {
    PanelType {
        component: ComponentType {
            id: id.into(),
            unit_cost: Money(unit_cost),
            capacity: Energy(capacity),
            lifespan: 50,
        },
        output: OutputDistribution {
            mean_fraction: Dimensionless(0.8),
            std_dev_fraction: Dimensionless(0.1),
        },
    }
}

#[test]
fn test_large_big_m_is_enforced() {
    // A cheap small panel has a very large big-M, so a fractional selection of it must not be able
    // to carry whole units
    let mut parameters = load_demo("single_type");
    parameters.catalog.panels = vec![panel("big", 1.0, 20.0), panel("small", 0.06, 1.0)];
    parameters.project.daily_energy_demand = Energy(21.0);
    parameters.project.total_budget = Money(1e7);

    let report = expect_sized(size(&parameters));
    let panels = report.component(ComponentClass::Panel);
    assert!(panels.quantity > 0);
    assert_objective_matches_cost(&report);
}
