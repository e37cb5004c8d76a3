//! The full set of inputs for a sizing run and the checks applied to them.
//!
//! Validation happens eagerly: a [`ParameterSet`] which fails [`ParameterSet::validate`] must never
//! be turned into an optimisation model.
use crate::component::{Catalog, ComponentClass, ComponentType, OutputDistribution};
use crate::id::check_ids_unique;
use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use strum::IntoEnumIterator;

/// Longest project which can be sized, in years.
///
/// Keeps the number of units bought over the project within range of a `u32`.
pub const MAX_PROJECT_DURATION: u32 = 1000;

/// Scalar parameters describing the project as a whole
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectParameters {
    /// Flat interest rate applied to the capital cost for each year of the loan
    pub loan_rate: Dimensionless,
    /// Length of the loan in years
    pub loan_term: u32,
    /// Length of the project in years
    pub project_duration: u32,
    /// Energy which must be supplied each day (kWh)
    pub daily_energy_demand: Energy,
    /// Upper limit on the total (capital plus interest) cost
    pub total_budget: Money,
    /// Probability with which the guaranteed panel output must be met or exceeded
    pub confidence_level: Dimensionless,
    /// Cost of buying electricity from the grid, used to value the energy generated
    pub grid_electricity_cost: MoneyPerEnergy,
}

/// The component catalog together with the project parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    /// Available component types
    pub catalog: Catalog,
    /// Project-wide parameters
    pub project: ProjectParameters,
}

impl ParameterSet {
    /// Check that all parameters are valid.
    ///
    /// An error here corresponds to an invalid parameter; the model must not be built.
    pub fn validate(&self) -> Result<()> {
        for class in ComponentClass::iter() {
            check_catalog_class(&self.catalog, class)
                .with_context(|| format!("Invalid catalog for class '{class}'"))?;
        }

        for panel in &self.catalog.panels {
            check_output_distribution(&panel.output).with_context(|| {
                format!(
                    "Invalid output distribution for panel '{}'",
                    panel.component.id
                )
            })?;
        }

        self.project
            .validate()
            .context("Invalid project parameters")
    }
}

impl ProjectParameters {
    /// Check that the project parameters are valid
    pub fn validate(&self) -> Result<()> {
        check_confidence_level(self.confidence_level)?;

        ensure!(
            self.loan_rate.is_finite() && self.loan_rate >= Dimensionless(0.0),
            "loan_rate must be a finite number greater than or equal to zero"
        );
        ensure!(
            (1..=MAX_PROJECT_DURATION).contains(&self.project_duration),
            "project_duration must be between 1 and {MAX_PROJECT_DURATION} years"
        );
        ensure!(
            self.daily_energy_demand.is_finite() && self.daily_energy_demand >= Energy(0.0),
            "daily_energy_demand must be a finite number greater than or equal to zero"
        );
        ensure!(
            self.total_budget.is_finite() && self.total_budget >= Money(0.0),
            "total_budget must be a finite number greater than or equal to zero"
        );
        ensure!(
            self.grid_electricity_cost.is_finite()
                && self.grid_electricity_cost >= MoneyPerEnergy(0.0),
            "grid_electricity_cost must be a finite number greater than or equal to zero"
        );

        Ok(())
    }
}

/// Check that the confidence level lies strictly between zero and one.
///
/// At one (or above) the corresponding z-score is infinite, so the storage requirement would be
/// unbounded.
pub fn check_confidence_level(confidence_level: Dimensionless) -> Result<()> {
    ensure!(
        confidence_level > Dimensionless(0.0) && confidence_level < Dimensionless(1.0),
        "confidence_level must be strictly between 0 and 1"
    );

    Ok(())
}

/// Check the types for one class of component
fn check_catalog_class(catalog: &Catalog, class: ComponentClass) -> Result<()> {
    ensure!(
        catalog.num_types(class) > 0,
        "At least one type must be provided"
    );

    check_ids_unique(catalog.iter_types(class).map(|component| &component.id))?;

    for component in catalog.iter_types(class) {
        check_component_type(component)
            .with_context(|| format!("Invalid parameters for type '{}'", component.id))?;
    }

    Ok(())
}

/// Check that cost, capacity and lifespan are all positive
fn check_component_type(component: &ComponentType) -> Result<()> {
    ensure!(
        component.unit_cost.is_finite() && component.unit_cost > Money(0.0),
        "unit_cost must be a finite number greater than zero"
    );
    ensure!(
        component.capacity.is_finite() && component.capacity > Energy(0.0),
        "capacity must be a finite number greater than zero"
    );
    ensure!(component.lifespan > 0, "lifespan must be greater than zero");

    Ok(())
}

/// Check that the output fractions of a panel are sensible
fn check_output_distribution(output: &OutputDistribution) -> Result<()> {
    ensure!(
        output.mean_fraction.is_finite()
            && output.mean_fraction >= Dimensionless(0.0)
            && output.mean_fraction <= Dimensionless(1.0),
        "mean_output_fraction must be between 0 and 1"
    );
    ensure!(
        output.std_dev_fraction.is_finite() && output.std_dev_fraction >= Dimensionless(0.0),
        "std_dev_fraction must be a finite number greater than or equal to zero"
    );

    Ok(())
}
