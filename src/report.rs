//! Turns an optimal solution into a report of what to install and what it costs.
use crate::component::ComponentClass;
use crate::finance::{Costs, lifetime_unit_count};
use crate::model::{SizingModel, VariableKind};
use crate::parameters::ParameterSet;
use crate::solver::{RowDefinition, Solution};
use crate::stochastic::required_storage;
use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use strum::IntoEnumIterator;

/// Solver values this close to an integer are treated as that integer
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// A constraint is binding if its slack is within this tolerance (relative to its bound)
const BINDING_TOLERANCE: f64 = 1e-6;

/// Days in a year, for converting daily energy to annual energy
const DAYS_PER_YEAR: f64 = 365.0;

/// What to install for one class of component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSizing {
    /// The class of component
    pub class: ComponentClass,
    /// Position of the chosen type in the catalog
    pub type_index: usize,
    /// ID of the chosen type
    pub type_id: String,
    /// Number of units to install
    pub quantity: u32,
    /// Number of units bought over the project per installed unit, including replacements
    pub lifetime_unit_count: u32,
    /// Combined capacity of the installed units
    pub installed_capacity: Energy,
    /// Capital cost of this class, including replacements
    pub capital_cost: Money,
}

/// The economics of a sizing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Economics {
    /// Cost of buying every unit, including replacements
    pub capital_cost: Money,
    /// Interest on the capital cost
    pub interest_cost: Money,
    /// Capital plus interest
    pub total_cost: Money,
    /// Nameplate panel generation per day
    pub total_energy_generated_daily: Energy,
    /// Nameplate panel generation per year
    pub total_annual_energy_generated: Energy,
    /// Value of the annual generation at the grid electricity price
    pub total_annual_savings: Money,
    /// Total cost divided by annual generation (infinite if nothing is generated)
    pub cost_per_kwh: MoneyPerEnergy,
    /// Years of savings needed to cover the total cost (infinite if there are no savings)
    pub breakeven_years: f64,
}

impl Economics {
    /// Derive the economics from the costs and the daily panel generation
    pub fn new(costs: Costs, daily_generation: Energy, parameters: &ParameterSet) -> Self {
        let annual_generation = daily_generation * Dimensionless(DAYS_PER_YEAR);
        let annual_savings = annual_generation * parameters.project.grid_electricity_cost;

        let cost_per_kwh = if annual_generation == Energy(0.0) {
            MoneyPerEnergy(f64::INFINITY)
        } else {
            costs.total_cost / annual_generation
        };
        let breakeven_years = if annual_savings == Money(0.0) {
            f64::INFINITY
        } else {
            (costs.total_cost / annual_savings).value()
        };

        Self {
            capital_cost: costs.capital_cost,
            interest_cost: costs.interest_cost,
            total_cost: costs.total_cost,
            total_energy_generated_daily: daily_generation,
            total_annual_energy_generated: annual_generation,
            total_annual_savings: annual_savings,
            cost_per_kwh,
            breakeven_years,
        }
    }
}

/// The result of a successful sizing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Storage needed to cover the demand at the confidence level
    pub required_storage: Energy,
    /// The z-score corresponding to the confidence level
    pub z_score: Dimensionless,
    /// Objective value reported by the solver
    pub objective_value: f64,
    /// Constraints with no slack at the optimum
    pub binding_constraints: Vec<String>,
    /// Costs and derived metrics
    pub economics: Economics,
    /// What to install for each class
    pub components: Vec<ComponentSizing>,
}

impl Report {
    /// Get the sizing for the given class
    pub fn component(&self, class: ComponentClass) -> &ComponentSizing {
        self.components
            .iter()
            .find(|sizing| sizing.class == class)
            .expect("Report should contain every class")
    }
}

/// Convert a solver value for an integer variable to an integer
fn to_integer(value: f64) -> Result<u32> {
    let rounded = value.round();
    ensure!(
        (value - rounded).abs() <= INTEGRALITY_TOLERANCE,
        "Solver returned non-integer value {value} for an integer variable"
    );
    ensure!(
        rounded >= 0.0,
        "Solver returned negative value {value} for a non-negative variable"
    );

    Ok(rounded as u32)
}

/// Integer values of the quantity and selection variables, keyed by class and type index
struct IntegerSolution {
    quantities: IndexMap<(ComponentClass, usize), u32>,
    selections: IndexMap<(ComponentClass, usize), u32>,
}

impl IntegerSolution {
    fn new(model: &SizingModel, solution: &Solution) -> Result<Self> {
        let mut quantities = IndexMap::new();
        let mut selections = IndexMap::new();
        for (key, var) in model.variables.iter() {
            let value = to_integer(solution.value(*var)).with_context(|| {
                format!(
                    "Invalid {} for {} type {}",
                    key.kind, key.class, key.type_index
                )
            })?;
            let map = match key.kind {
                VariableKind::Quantity => &mut quantities,
                VariableKind::Selection => &mut selections,
            };
            map.insert((key.class, key.type_index), value);
        }

        Ok(Self {
            quantities,
            selections,
        })
    }

    fn quantity(&self, class: ComponentClass, type_index: usize) -> u32 {
        self.quantities[&(class, type_index)]
    }

    /// Check that exactly one type is selected per class and only selected types are installed.
    ///
    /// Returns the selected type index for each class.
    fn check_selections(&self) -> Result<IndexMap<ComponentClass, usize>> {
        let mut selected = IndexMap::new();
        for class in ComponentClass::iter() {
            let chosen: Vec<_> = self
                .selections
                .iter()
                .filter(|((c, _), value)| *c == class && **value == 1)
                .map(|((_, type_index), _)| *type_index)
                .collect();
            ensure!(
                chosen.len() == 1,
                "Expected exactly one {class} type to be selected, found {}",
                chosen.len()
            );
            selected.insert(class, chosen[0]);
        }

        for (&(class, type_index), &quantity) in &self.quantities {
            ensure!(
                quantity == 0 || selected[&class] == type_index,
                "{quantity} units of unselected {class} type {type_index} are installed"
            );
        }

        Ok(selected)
    }
}

/// Distance from the row's activity to its nearest finite bound, scaled by the bound's magnitude
fn relative_slack(row: &RowDefinition, activity: f64) -> f64 {
    [row.min, row.max]
        .into_iter()
        .filter(|bound| bound.is_finite())
        .map(|bound| (activity - bound).abs() / (1.0 + bound.abs()))
        .fold(f64::INFINITY, f64::min)
}

/// The labels of constraints with no slack, ignoring those which only encode type selection
fn binding_constraints(model: &SizingModel, solution: &Solution) -> Vec<String> {
    model
        .constraints
        .iter()
        .enumerate()
        .filter(|(_, kind)| !kind.is_selection_logic())
        .filter(|(row, _)| {
            let activity = model.program.row_activity(*row, &solution.columns);
            relative_slack(&model.program.rows()[*row], activity) <= BINDING_TOLERANCE
        })
        .map(|(_, kind)| kind.to_string())
        .collect()
}

/// Build a report from an optimal solution.
///
/// Quantities are validated as integral and the type selection rules are checked. A failure
/// indicates a problem with the solver rather than with the parameters.
pub fn extract_report(
    model: &SizingModel,
    solution: &Solution,
    parameters: &ParameterSet,
) -> Result<Report> {
    let values = IntegerSolution::new(model, solution)?;
    let selected = values.check_selections()?;
    let duration = parameters.project.project_duration;

    let components = selected
        .iter()
        .map(|(&class, &type_index)| {
            let component = parameters
                .catalog
                .get_type(class, type_index)
                .with_context(|| format!("No {class} type with index {type_index}"))?;
            let quantity = values.quantity(class, type_index);
            let count = lifetime_unit_count(duration, component.lifespan);
            let units = Dimensionless::from(quantity);

            Ok(ComponentSizing {
                class,
                type_index,
                type_id: component.id.to_string(),
                quantity,
                lifetime_unit_count: count,
                installed_capacity: component.capacity * units,
                capital_cost: component.unit_cost * units * Dimensionless::from(count),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let costs = Costs::evaluate(parameters, |class, type_index| {
        values.quantity(class, type_index)
    });
    let panel_index = selected[&ComponentClass::Panel];
    let panel = &parameters.catalog.panels[panel_index];
    let panel_quantity = values.quantity(ComponentClass::Panel, panel_index);
    let daily_generation = panel.component.capacity * Dimensionless::from(panel_quantity);
    let storage = required_storage(
        [(panel, panel_quantity)],
        parameters.project.daily_energy_demand,
        model.z_score,
    );

    let binding_constraints = binding_constraints(model, solution);
    debug!("Binding constraints: {}", binding_constraints.join(", "));

    Ok(Report {
        required_storage: storage,
        z_score: model.z_score,
        objective_value: solution.objective_value,
        binding_constraints,
        economics: Economics::new(costs, daily_generation, parameters),
        components,
    })
}
