//! Code for reading the project parameters file.
use super::read_toml;
use crate::parameters::ProjectParameters;
use anyhow::Result;
use std::path::Path;

const PROJECT_FILE_NAME: &str = "project.toml";

/// Read the project parameters from the model directory.
///
/// The parameters are not validated here.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_project_parameters(model_dir: &Path) -> Result<ProjectParameters> {
    read_toml(&model_dir.join(PROJECT_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_project_parameters() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE_NAME),
            "loan_rate = 0.02
loan_term = 10
project_duration = 40
daily_energy_demand = 100.0
total_budget = 1000000.0
confidence_level = 0.7
grid_electricity_cost = 0.1
",
        )
        .unwrap();

        assert_eq!(
            read_project_parameters(dir.path()).unwrap(),
            ProjectParameters {
                loan_rate: Dimensionless(0.02),
                loan_term: 10,
                project_duration: 40,
                daily_energy_demand: Energy(100.0),
                total_budget: Money(1_000_000.0),
                confidence_level: Dimensionless(0.7),
                grid_electricity_cost: MoneyPerEnergy(0.1),
            }
        );
    }

    #[test]
    fn test_read_project_parameters_missing_field() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE_NAME), "loan_rate = 0.02\n").unwrap();
        assert!(read_project_parameters(dir.path()).is_err());
    }
}
