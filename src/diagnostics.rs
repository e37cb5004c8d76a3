//! Explains why no sizing could be found.
//!
//! Ignoring the budget, the cheapest sizing can be found directly. For a given panel type, the
//! smallest number of panels meeting demand is best, because both battery requirements grow with
//! the number of panels. The cheapest battery and inverter types are then chosen for the resulting
//! requirements. If even this sizing costs more than the budget, the budget is the constraint to
//! relax.
use crate::component::{ComponentClass, ComponentType};
use crate::finance::{Costs, lifetime_unit_cost};
use crate::parameters::ParameterSet;
use crate::stochastic::storage_shortfall;
use crate::units::{Dimensionless, Energy, Money};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_string_enum::SerializeLabeledStringEnum;

/// Tolerance used when rounding unit counts up
const COUNT_TOLERANCE: f64 = 1e-9;

/// The constraint suspected of making the problem infeasible
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum)]
pub enum SuspectedConstraint {
    /// The cheapest sizing meeting demand costs more than the budget
    #[string = "budget"]
    Budget,
    /// The budget would be sufficient; the cause could not be identified
    #[string = "unidentified"]
    Unidentified,
}

/// The number of units of one type in a sizing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    /// Position of the type in the catalog
    pub type_index: usize,
    /// ID of the type
    pub type_id: String,
    /// Number of units installed
    pub quantity: u32,
}

/// The cheapest sizing which meets demand, regardless of budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheapestSizing {
    /// Panels to install
    pub panel: TypeCount,
    /// Batteries to install
    pub battery: TypeCount,
    /// Inverters to install
    pub inverter: TypeCount,
    /// Cost of the sizing
    pub costs: Costs,
}

/// An explanation of why no feasible sizing exists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfeasibilityReport {
    /// The constraint most likely responsible
    pub suspected_constraint: SuspectedConstraint,
    /// The budget which was given
    pub total_budget: Money,
    /// How much more than the budget the cheapest sizing costs (zero if it is affordable)
    pub budget_shortfall: Money,
    /// A description for the user
    pub message: String,
    /// The cheapest sizing which meets demand
    pub cheapest_sizing: CheapestSizing,
}

/// Smallest number of units with capacity `unit_capacity` providing at least `required`
fn units_required(required: Energy, unit_capacity: Energy) -> u32 {
    if required <= Energy(0.0) {
        return 0;
    }

    ((required / unit_capacity).value() - COUNT_TOLERANCE).ceil() as u32
}

/// Find the cheapest type (and number of units) providing at least `required` capacity
fn cheapest_type<'a, I>(types: I, required: Energy, duration: u32) -> Option<(usize, u32, Money)>
where
    I: IntoIterator<Item = &'a ComponentType>,
{
    types
        .into_iter()
        .enumerate()
        .map(|(index, component)| {
            let quantity = units_required(required, component.capacity);
            let cost = lifetime_unit_cost(component, duration) * Dimensionless::from(quantity);
            (index, quantity, cost)
        })
        .min_by(|a, b| a.2.value().total_cmp(&b.2.value()))
}

fn type_count(
    parameters: &ParameterSet,
    class: ComponentClass,
    index: usize,
    quantity: u32,
) -> TypeCount {
    let type_id = parameters
        .catalog
        .get_type(class, index)
        .map(|component| component.id.to_string())
        .unwrap_or_default();
    TypeCount {
        type_index: index,
        type_id,
        quantity,
    }
}

/// Find the cheapest sizing meeting the capacity, storage and absorption constraints.
///
/// `parameters` must already have been validated.
pub fn cheapest_sizing(parameters: &ParameterSet, z: Dimensionless) -> Result<CheapestSizing> {
    let project = &parameters.project;
    let demand = project.daily_energy_demand;
    let duration = project.project_duration;

    // For each panel type: the panel count and cost, plus the cheapest batteries to go with them
    let (panel_index, panel_quantity, battery, panels_and_batteries_cost) = parameters
        .catalog
        .panels
        .iter()
        .enumerate()
        .filter_map(|(index, panel)| {
            let quantity = units_required(demand, panel.component.capacity);
            let count = Dimensionless::from(quantity);
            let generation = panel.component.capacity * count;
            let storage = storage_shortfall(panel, demand, z) * count;
            let battery_requirement = if generation > storage {
                generation
            } else {
                storage
            };
            let battery =
                cheapest_type(&parameters.catalog.batteries, battery_requirement, duration)?;
            let cost = lifetime_unit_cost(&panel.component, duration) * count + battery.2;

            Some((index, quantity, battery, cost))
        })
        .min_by(|a, b| a.3.value().total_cmp(&b.3.value()))
        .context("No panel types available")?;

    let inverter = cheapest_type(&parameters.catalog.inverters, demand, duration)
        .context("No inverter types available")?;

    let capital_cost = panels_and_batteries_cost + inverter.2;
    Ok(CheapestSizing {
        panel: type_count(parameters, ComponentClass::Panel, panel_index, panel_quantity),
        battery: type_count(parameters, ComponentClass::Battery, battery.0, battery.1),
        inverter: type_count(parameters, ComponentClass::Inverter, inverter.0, inverter.1),
        costs: Costs::from_capital_cost(capital_cost, project),
    })
}

/// Work out which constraint is likely to be responsible for infeasibility
pub fn diagnose_infeasibility(
    parameters: &ParameterSet,
    z: Dimensionless,
) -> Result<InfeasibilityReport> {
    let cheapest_sizing = cheapest_sizing(parameters, z)?;
    let total_budget = parameters.project.total_budget;
    let total_cost = cheapest_sizing.costs.total_cost;

    let (suspected_constraint, budget_shortfall, message) = if total_cost > total_budget {
        let shortfall = total_cost - total_budget;
        (
            SuspectedConstraint::Budget,
            shortfall,
            format!(
                "No feasible sizing within the budget of {total_budget}: meeting a daily demand of \
                {} at confidence level {} costs at least {total_cost} ({shortfall} over budget)",
                parameters.project.daily_energy_demand, parameters.project.confidence_level
            ),
        )
    } else {
        (
            SuspectedConstraint::Unidentified,
            Money(0.0),
            format!(
                "No feasible sizing was found, although a sizing costing {total_cost} fits within \
                the budget of {total_budget}"
            ),
        )
    };

    Ok(InfeasibilityReport {
        suspected_constraint,
        total_budget,
        budget_shortfall,
        message,
        cheapest_sizing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{catalog_parameters, parameters};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(20.0, 5.0, 4)]
    #[case(21.0, 5.0, 5)]
    #[case(0.0, 5.0, 0)]
    #[case(-3.0, 5.0, 0)]
    #[case(64.0, 5.0, 13)]
    fn test_units_required(#[case] required: f64, #[case] capacity: f64, #[case] expected: u32) {
        assert_eq!(units_required(Energy(required), Energy(capacity)), expected);
    }

    #[rstest]
    fn test_cheapest_sizing_single_type(parameters: ParameterSet) {
        let sizing = cheapest_sizing(&parameters, Dimensionless(0.0)).unwrap();
        assert_eq!(sizing.panel.quantity, 4);
        // Storage: 4 * (20 - 4) = 64 kWh, so 13 batteries of 5 kWh
        assert_eq!(sizing.battery.quantity, 13);
        assert_eq!(sizing.inverter.quantity, 4);
        // (4 + 13 + 4) units, each bought 5 times at 1000
        assert_approx_eq!(Money, sizing.costs.total_cost, Money(105000.0));
    }

    #[rstest]
    fn test_cheapest_sizing_catalog(catalog_parameters: ParameterSet) {
        let z = crate::stochastic::z_score(catalog_parameters.project.confidence_level).unwrap();
        let sizing = cheapest_sizing(&catalog_parameters, z).unwrap();

        // The largest panels need the fewest units and so the least storage
        assert_eq!(sizing.panel.type_id, "p7");
        assert_eq!(sizing.panel.quantity, 15);
        assert_eq!(sizing.battery.type_id, "b14");
        assert_eq!(sizing.inverter.type_id, "i20");
        assert_eq!(sizing.inverter.quantity, 5);
    }

    #[rstest]
    fn test_diagnose_budget(mut parameters: ParameterSet) {
        parameters.project.total_budget = Money(100000.0);
        let report = diagnose_infeasibility(&parameters, Dimensionless(0.0)).unwrap();
        assert_eq!(report.suspected_constraint, SuspectedConstraint::Budget);
        assert_approx_eq!(Money, report.budget_shortfall, Money(5000.0));
    }

    #[rstest]
    fn test_diagnose_unidentified(parameters: ParameterSet) {
        let report = diagnose_infeasibility(&parameters, Dimensionless(0.0)).unwrap();
        assert_eq!(report.suspected_constraint, SuspectedConstraint::Unidentified);
        assert_eq!(report.budget_shortfall, Money(0.0));
    }
}
