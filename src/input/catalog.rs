//! Code for reading the component catalog from CSV files.
use super::read_csv;
use crate::component::{Catalog, ComponentType, OutputDistribution, PanelType};
use crate::id::ComponentTypeID;
use crate::units::{Dimensionless, Energy, Money};
use anyhow::Result;
use log::debug;
use serde::Deserialize;
use std::path::Path;

const PANELS_FILE_NAME: &str = "panels.csv";
const BATTERIES_FILE_NAME: &str = "batteries.csv";
const INVERTERS_FILE_NAME: &str = "inverters.csv";

/// A row of the panels CSV file
#[derive(Debug, PartialEq, Deserialize)]
struct PanelTypeRaw {
    id: ComponentTypeID,
    unit_cost: Money,
    capacity: Energy,
    lifespan: u32,
    mean_output_fraction: Dimensionless,
    std_dev_fraction: Dimensionless,
}

impl From<PanelTypeRaw> for PanelType {
    fn from(raw: PanelTypeRaw) -> Self {
        Self {
            component: ComponentType {
                id: raw.id,
                unit_cost: raw.unit_cost,
                capacity: raw.capacity,
                lifespan: raw.lifespan,
            },
            output: OutputDistribution {
                mean_fraction: raw.mean_output_fraction,
                std_dev_fraction: raw.std_dev_fraction,
            },
        }
    }
}

/// A row of the batteries or inverters CSV file
#[derive(Debug, PartialEq, Deserialize)]
struct ComponentTypeRaw {
    id: ComponentTypeID,
    unit_cost: Money,
    capacity: Energy,
    lifespan: u32,
}

impl From<ComponentTypeRaw> for ComponentType {
    fn from(raw: ComponentTypeRaw) -> Self {
        Self {
            id: raw.id,
            unit_cost: raw.unit_cost,
            capacity: raw.capacity,
            lifespan: raw.lifespan,
        }
    }
}

/// Read the types for a class without an output distribution
fn read_component_types(file_path: &Path) -> Result<Vec<ComponentType>> {
    let types = read_csv::<ComponentTypeRaw>(file_path)?
        .into_iter()
        .map(ComponentType::from)
        .collect();

    Ok(types)
}

/// Read the catalog from the panels, batteries and inverters CSV files.
///
/// The order of rows in each file gives the type index of each type. The catalog is not validated
/// here.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_catalog(model_dir: &Path) -> Result<Catalog> {
    let panels: Vec<PanelType> = read_csv::<PanelTypeRaw>(&model_dir.join(PANELS_FILE_NAME))?
        .into_iter()
        .map(PanelType::from)
        .collect();
    let batteries = read_component_types(&model_dir.join(BATTERIES_FILE_NAME))?;
    let inverters = read_component_types(&model_dir.join(INVERTERS_FILE_NAME))?;

    debug!(
        "Read catalog with {} panel, {} battery and {} inverter types",
        panels.len(),
        batteries.len(),
        inverters.len()
    );

    Ok(Catalog {
        panels,
        batteries,
        inverters,
    })
}
