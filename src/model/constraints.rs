//! Constraints for the sizing model.
//!
//! Every row of the program is labelled with a [`ConstraintKind`] so that it can be identified
//! when reporting on a solution.
use super::{VariableKind, VariableMap};
use crate::component::ComponentClass;
use crate::parameters::ParameterSet;
use crate::solver::{LinearProgram, Variable};
use crate::stochastic::storage_shortfall;
use crate::units::Dimensionless;
use indexmap::IndexMap;
use std::fmt;
use strum::IntoEnumIterator;

/// The constraints of the sizing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Panel capacity must cover the daily demand
    PanelCapacity,
    /// Battery capacity must cover the confidence-adjusted storage requirement
    BatteryStorage,
    /// Inverter capacity must cover the daily demand
    InverterCapacity,
    /// Battery capacity must be able to absorb all panel generation
    BatteryAbsorption,
    /// Total cost must be within the budget
    Budget,
    /// Exactly one type must be selected for the class
    TypeSelection(ComponentClass),
    /// Units of a type may only be installed if the type is selected
    TypeLink(ComponentClass, usize),
}

impl ConstraintKind {
    /// Whether the constraint only ties quantities to type selections
    pub fn is_selection_logic(self) -> bool {
        matches!(self, Self::TypeSelection(_) | Self::TypeLink(..))
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PanelCapacity => write!(f, "panel_capacity"),
            Self::BatteryStorage => write!(f, "battery_storage"),
            Self::InverterCapacity => write!(f, "inverter_capacity"),
            Self::BatteryAbsorption => write!(f, "battery_absorption"),
            Self::Budget => write!(f, "budget"),
            Self::TypeSelection(class) => write!(f, "{class}_selection"),
            Self::TypeLink(class, index) => write!(f, "{class}_type_{index}_link"),
        }
    }
}

/// Keeps track of which constraint each row belongs to
struct Rows<'a> {
    program: &'a mut LinearProgram,
    kinds: Vec<ConstraintKind>,
}

impl Rows<'_> {
    /// Add a row, labelled with its kind
    fn add<B, I>(&mut self, kind: ConstraintKind, bounds: B, terms: I)
    where
        B: std::ops::RangeBounds<f64>,
        I: IntoIterator<Item = (Variable, f64)>,
    {
        let row = self.program.add_row(bounds, terms);
        assert_eq!(row, self.kinds.len(), "Rows added without a label");
        self.kinds.push(kind);
    }
}

/// Capacity terms for every type of a class: quantity variable times unit capacity
fn capacity_terms(
    variables: &VariableMap,
    parameters: &ParameterSet,
    class: ComponentClass,
    sign: f64,
) -> Vec<(Variable, f64)> {
    parameters
        .catalog
        .iter_types(class)
        .zip(variables.iter_class(class, VariableKind::Quantity))
        .map(|(component, (_, var))| (var, sign * component.capacity.value()))
        .collect()
}

/// Add all constraints to the program.
///
/// # Returns
///
/// The kind of each row added, in row order.
pub fn add_constraints(
    program: &mut LinearProgram,
    variables: &VariableMap,
    big_m: &IndexMap<(ComponentClass, usize), f64>,
    parameters: &ParameterSet,
    z: Dimensionless,
) -> Vec<ConstraintKind> {
    let mut rows = Rows {
        program,
        kinds: Vec::new(),
    };

    add_capacity_constraints(&mut rows, variables, parameters, z);
    add_budget_constraint(&mut rows, variables, parameters);
    add_selection_constraints(&mut rows, variables);
    add_link_constraints(&mut rows, variables, big_m);

    rows.kinds
}

/// Add the demand, storage and absorption constraints.
///
/// With `q` the quantity of each type and `E` the daily demand:
///
/// 1. Σ q_panel · capacity ≥ E
/// 2. Σ q_battery · capacity - Σ q_panel · (E - guaranteed output) ≥ 0
/// 3. Σ q_inverter · capacity ≥ E
/// 4. Σ q_battery · capacity - Σ q_panel · capacity ≥ 0
fn add_capacity_constraints(
    rows: &mut Rows,
    variables: &VariableMap,
    parameters: &ParameterSet,
    z: Dimensionless,
) {
    let demand = parameters.project.daily_energy_demand;
    let panel_terms = capacity_terms(variables, parameters, ComponentClass::Panel, 1.0);
    let battery_terms = capacity_terms(variables, parameters, ComponentClass::Battery, 1.0);

    rows.add(
        ConstraintKind::PanelCapacity,
        demand.value()..,
        panel_terms.iter().copied(),
    );

    let shortfall_terms = parameters
        .catalog
        .panels
        .iter()
        .zip(variables.iter_class(ComponentClass::Panel, VariableKind::Quantity))
        .map(|(panel, (_, var))| (var, -storage_shortfall(panel, demand, z).value()));
    rows.add(
        ConstraintKind::BatteryStorage,
        0.0..,
        battery_terms.iter().copied().chain(shortfall_terms),
    );

    rows.add(
        ConstraintKind::InverterCapacity,
        demand.value()..,
        capacity_terms(variables, parameters, ComponentClass::Inverter, 1.0),
    );

    rows.add(
        ConstraintKind::BatteryAbsorption,
        0.0..,
        battery_terms.into_iter().chain(capacity_terms(
            variables,
            parameters,
            ComponentClass::Panel,
            -1.0,
        )),
    );
}

/// Add the budget constraint.
///
/// The coefficients are the same as those of the objective, i.e. the total cost.
fn add_budget_constraint(rows: &mut Rows, variables: &VariableMap, parameters: &ParameterSet) {
    let terms: Vec<_> = variables
        .iter()
        .filter(|(key, _)| key.kind == VariableKind::Quantity)
        .map(|(_, var)| (*var, rows.program.columns()[var.index()].cost))
        .collect();

    rows.add(
        ConstraintKind::Budget,
        ..=parameters.project.total_budget.value(),
        terms,
    );
}

/// Add constraints requiring exactly one type to be selected for each class
fn add_selection_constraints(rows: &mut Rows, variables: &VariableMap) {
    for class in ComponentClass::iter() {
        let terms: Vec<_> = variables
            .iter_class(class, VariableKind::Selection)
            .map(|(_, var)| (var, 1.0))
            .collect();
        rows.add(ConstraintKind::TypeSelection(class), 1.0..=1.0, terms);
    }
}

/// Add the big-M constraints linking quantities to selections: q - M·y ≤ 0
fn add_link_constraints(
    rows: &mut Rows,
    variables: &VariableMap,
    big_m: &IndexMap<(ComponentClass, usize), f64>,
) {
    for (&(class, type_index), &m) in big_m {
        let quantity = variables.get(class, type_index, VariableKind::Quantity);
        let selection = variables.get(class, type_index, VariableKind::Selection);
        rows.add(
            ConstraintKind::TypeLink(class, type_index),
            ..=0.0,
            [(quantity, 1.0), (selection, -m)],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::parameters;
    use crate::model::build_model;
    use crate::units::Money;
    use rstest::rstest;

    #[rstest]
    fn test_constraint_labels(parameters: ParameterSet) {
        let model = build_model(&parameters).unwrap();
        assert_eq!(model.constraints.len(), model.program.rows().len());
        assert_eq!(
            model.constraints,
            [
                ConstraintKind::PanelCapacity,
                ConstraintKind::BatteryStorage,
                ConstraintKind::InverterCapacity,
                ConstraintKind::BatteryAbsorption,
                ConstraintKind::Budget,
                ConstraintKind::TypeSelection(ComponentClass::Panel),
                ConstraintKind::TypeSelection(ComponentClass::Battery),
                ConstraintKind::TypeSelection(ComponentClass::Inverter),
                ConstraintKind::TypeLink(ComponentClass::Panel, 0),
                ConstraintKind::TypeLink(ComponentClass::Battery, 0),
                ConstraintKind::TypeLink(ComponentClass::Inverter, 0),
            ]
        );
    }

    #[rstest]
    fn test_battery_storage_row(parameters: ParameterSet) {
        // Confidence level is 0.5, so each panel needs 20 - 5 * 0.8 = 16 kWh of storage
        let model = build_model(&parameters).unwrap();
        let row = &model.program.rows()[1];
        let panel = model
            .variables
            .get(ComponentClass::Panel, 0, VariableKind::Quantity);
        let battery = model
            .variables
            .get(ComponentClass::Battery, 0, VariableKind::Quantity);
        assert_eq!(row.min, 0.0);
        assert_eq!(row.terms, [(battery, 5.0), (panel, -16.0)]);
    }

    #[rstest]
    fn test_budget_row(parameters: ParameterSet) {
        let model = build_model(&parameters).unwrap();
        let row = &model.program.rows()[4];
        assert_eq!(row.max, parameters.project.total_budget.value());
        assert!(row.terms.iter().all(|(_, coeff)| *coeff == 5000.0));
    }

    #[rstest]
    fn test_link_row_uses_big_m(mut parameters: ParameterSet) {
        parameters.project.total_budget = Money(12345.0);
        let model = build_model(&parameters).unwrap();
        let row = model.program.rows().last().unwrap();
        // floor(12345 / 5000)
        assert_eq!(row.terms[1].1, -2.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ConstraintKind::TypeLink(ComponentClass::Battery, 2).to_string(),
            "battery_type_2_link"
        );
        assert_eq!(
            ConstraintKind::TypeSelection(ComponentClass::Panel).to_string(),
            "panel_selection"
        );
    }
}
