//! The cost model: replacement-adjusted capital cost and simple loan interest.
//!
//! Costs are linear in the number of units installed. The per-unit coefficients computed here are
//! used both for the objective and budget rows of the optimisation model and for evaluating the
//! cost of a solution afterwards, so the two always agree.
use crate::component::{ComponentClass, ComponentType};
use crate::parameters::{ParameterSet, ProjectParameters};
use crate::units::{Dimensionless, Money};
use serde::Serialize;
use strum::IntoEnumIterator;

/// Number of complete replacement cycles which fit within the project.
///
/// This is `floor(project_duration / lifespan)`; a partial final cycle is not counted.
pub fn replacement_cycles(project_duration: u32, lifespan: u32) -> u32 {
    project_duration / lifespan
}

/// Number of units which must be bought over the project for each unit installed.
///
/// This is the initial unit plus one for every complete replacement cycle. When the lifespan
/// divides the project duration exactly, the replacement falling due on the final year is still
/// bought.
pub fn lifetime_unit_count(project_duration: u32, lifespan: u32) -> u32 {
    replacement_cycles(project_duration, lifespan) + 1
}

/// Capital cost over the project of installing one unit of the given type
pub fn lifetime_unit_cost(component: &ComponentType, project_duration: u32) -> Money {
    let count = lifetime_unit_count(project_duration, component.lifespan);
    component.unit_cost * Dimensionless::from(count)
}

/// Interest as a multiple of the capital cost.
///
/// Interest is simple: the rate is applied to the whole capital cost for every year of the loan.
pub fn interest_factor(project: &ProjectParameters) -> Dimensionless {
    project.loan_rate * Dimensionless::from(project.loan_term)
}

/// Iterate over the lifetime cost per unit of every component type.
///
/// Items are `(class, type index, cost)`, ordered by class and then by position in the catalog.
pub fn iter_lifetime_unit_costs(
    parameters: &ParameterSet,
) -> impl Iterator<Item = (ComponentClass, usize, Money)> + '_ {
    let duration = parameters.project.project_duration;
    ComponentClass::iter().flat_map(move |class| {
        parameters
            .catalog
            .iter_types(class)
            .enumerate()
            .map(move |(index, component)| (class, index, lifetime_unit_cost(component, duration)))
    })
}

/// The costs of a sizing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Costs {
    /// Cost of buying every unit, including replacements
    pub capital_cost: Money,
    /// Interest on the capital cost
    pub interest_cost: Money,
    /// Capital plus interest
    pub total_cost: Money,
}

impl Costs {
    /// Calculate the costs from a capital cost
    pub fn from_capital_cost(capital_cost: Money, project: &ProjectParameters) -> Self {
        let interest_cost = capital_cost * interest_factor(project);
        Self {
            capital_cost,
            interest_cost,
            total_cost: capital_cost + interest_cost,
        }
    }

    /// Calculate the costs for the given number of units of each component type.
    ///
    /// `quantity` is called with the class and type index of each type in the catalog.
    pub fn evaluate<F>(parameters: &ParameterSet, mut quantity: F) -> Self
    where
        F: FnMut(ComponentClass, usize) -> u32,
    {
        let capital_cost = iter_lifetime_unit_costs(parameters)
            .map(|(class, index, cost)| cost * Dimensionless::from(quantity(class, index)))
            .sum();

        Self::from_capital_cost(capital_cost, &parameters.project)
    }
}
