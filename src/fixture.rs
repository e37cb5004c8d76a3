//! Fixtures for tests

use crate::component::{Catalog, ComponentType, OutputDistribution, PanelType};
use crate::parameters::{ParameterSet, ProjectParameters};
use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy};
use itertools::izip;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

fn component_type(id: &str, unit_cost: f64, capacity: f64, lifespan: u32) -> ComponentType {
    ComponentType {
        id: id.into(),
        unit_cost: Money(unit_cost),
        capacity: Energy(capacity),
        lifespan,
    }
}

fn output_distribution() -> OutputDistribution {
    OutputDistribution {
        mean_fraction: Dimensionless(0.8),
        std_dev_fraction: Dimensionless(0.1),
    }
}

/// A 5 kWh panel costing 1000 which lasts 10 years
#[fixture]
pub fn panel_type() -> PanelType {
    PanelType {
        component: component_type("panel", 1000.0, 5.0, 10),
        output: output_distribution(),
    }
}

/// A catalog with one type for each class, all with the same cost, capacity and lifespan
#[fixture]
pub fn single_type_catalog(panel_type: PanelType) -> Catalog {
    Catalog {
        panels: vec![panel_type],
        batteries: vec![component_type("battery", 1000.0, 5.0, 10)],
        inverters: vec![component_type("inverter", 1000.0, 5.0, 10)],
    }
}

/// Parameters for which the optimum is 4 panels, 13 batteries and 4 inverters
#[fixture]
pub fn parameters(single_type_catalog: Catalog) -> ParameterSet {
    ParameterSet {
        catalog: single_type_catalog,
        project: ProjectParameters {
            loan_rate: Dimensionless(0.0),
            loan_term: 10,
            project_duration: 40,
            daily_energy_demand: Energy(20.0),
            total_budget: Money(200000.0),
            confidence_level: Dimensionless(0.5),
            grid_electricity_cost: MoneyPerEnergy(0.1),
        },
    }
}

/// A catalog with three types for each class
#[fixture]
pub fn catalog() -> Catalog {
    let panels = izip!(
        ["p5", "p6", "p7"],
        [1000.0, 1500.0, 2000.0],
        [5.0, 6.0, 7.0],
        [10, 15, 20]
    )
    .map(|(id, cost, capacity, lifespan)| PanelType {
        component: component_type(id, cost, capacity, lifespan),
        output: output_distribution(),
    })
    .collect();
    let batteries = izip!(
        ["b10", "b12", "b14"],
        [500.0, 750.0, 1000.0],
        [10.0, 12.0, 14.0],
        [5, 7, 10]
    )
    .map(|(id, cost, capacity, lifespan)| component_type(id, cost, capacity, lifespan))
    .collect();
    let inverters = izip!(
        ["i20", "i25", "i30"],
        [300.0, 450.0, 600.0],
        [20.0, 25.0, 30.0],
        [10, 10, 10]
    )
    .map(|(id, cost, capacity, lifespan)| component_type(id, cost, capacity, lifespan))
    .collect();

    Catalog {
        panels,
        batteries,
        inverters,
    }
}

/// Parameters using the three-type [`catalog`], with a budget large enough to be feasible
#[fixture]
pub fn catalog_parameters(catalog: Catalog) -> ParameterSet {
    ParameterSet {
        catalog,
        project: ProjectParameters {
            loan_rate: Dimensionless(0.02),
            loan_term: 10,
            project_duration: 40,
            daily_energy_demand: Energy(100.0),
            total_budget: Money(1_000_000.0),
            confidence_level: Dimensionless(0.7),
            grid_electricity_cost: MoneyPerEnergy(0.1),
        },
    }
}
