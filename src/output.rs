//! The module responsible for writing output data to disk.
use crate::report::Report;
use crate::sizing::SizingOutcome;
use anyhow::{Context, Result, ensure};
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "solar_sizing_results";

/// The output file name for the outcome of the sizing
const REPORT_FILE_NAME: &str = "report.toml";

/// The output file name for the table of installed components
const COMPONENTS_FILE_NAME: &str = "components.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data.
///
/// # Returns
///
/// True if the output directory contained data which has been deleted.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Write the table of installed components to a CSV file
fn write_components(output_path: &Path, report: &Report) -> Result<()> {
    let file_path = output_path.join(COMPONENTS_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)?;
    for sizing in &report.components {
        writer.serialize(sizing)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the outcome of a sizing to the output folder.
///
/// The outcome is always written to `report.toml`. If a sizing was found, the installed components
/// are also written to `components.csv`.
pub fn write_outcome(output_path: &Path, outcome: &SizingOutcome) -> Result<()> {
    let file_path = output_path.join(REPORT_FILE_NAME);
    fs::write(&file_path, toml::to_string(outcome)?)
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    if let SizingOutcome::Sized(report) = outcome {
        write_components(output_path, report)
            .with_context(|| format!("Could not write {COMPONENTS_FILE_NAME}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentClass;
    use crate::diagnostics::diagnose_infeasibility;
    use crate::finance::Costs;
    use crate::fixture::parameters;
    use crate::parameters::ParameterSet;
    use crate::report::{ComponentSizing, Economics};
    use crate::units::{Dimensionless, Energy, Money};
    use rstest::rstest;
    use tempfile::tempdir;

    fn report(parameters: &ParameterSet) -> Report {
        let costs = Costs::from_capital_cost(Money(105000.0), &parameters.project);
        Report {
            components: vec![ComponentSizing {
                class: ComponentClass::Panel,
                type_index: 0,
                type_id: "panel".into(),
                quantity: 4,
                lifetime_unit_count: 5,
                installed_capacity: Energy(20.0),
                capital_cost: Money(20000.0),
            }],
            economics: Economics::new(costs, Energy(0.0), parameters),
            required_storage: Energy(64.0),
            z_score: Dimensionless(0.0),
            objective_value: 105000.0,
            binding_constraints: vec!["panel_capacity".into()],
        }
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("new");

        // Create a new empty directory
        let overwrite = create_output_directory(&output_dir, false).unwrap();
        assert!(!overwrite);
        assert!(output_dir.is_dir());

        // Empty directories are reused without complaint
        let overwrite = create_output_directory(&output_dir, false).unwrap();
        assert!(!overwrite);
    }

    #[test]
    fn test_create_output_directory_existing_data() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("existing");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("file.txt"), "data").unwrap();

        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join("file.txt").is_file());

        let overwrite = create_output_directory(&output_dir, true).unwrap();
        assert!(overwrite);
        assert!(output_dir.is_dir());
        assert!(!output_dir.join("file.txt").exists());
    }

    #[rstest]
    fn test_write_outcome_sized(parameters: ParameterSet) {
        let dir = tempdir().unwrap();
        let outcome = SizingOutcome::Sized(report(&parameters));
        write_outcome(dir.path(), &outcome).unwrap();

        let contents = fs::read_to_string(dir.path().join(REPORT_FILE_NAME)).unwrap();
        assert!(contents.contains("status = \"sized\""));
        // Nothing is generated, so the cost per kWh is infinite
        assert!(contents.contains("cost_per_kwh = inf"));

        let table = fs::read_to_string(dir.path().join(COMPONENTS_FILE_NAME)).unwrap();
        let mut lines = table.lines();
        assert_eq!(
            lines.next(),
            Some(
                "class,type_index,type_id,quantity,lifetime_unit_count,installed_capacity,\
                capital_cost"
            )
        );
        assert_eq!(lines.next(), Some("panel,0,panel,4,5,20.0,20000.0"));
    }

    #[rstest]
    fn test_write_outcome_infeasible(mut parameters: ParameterSet) {
        parameters.project.total_budget = Money(1000.0);
        let diagnosis = diagnose_infeasibility(&parameters, Dimensionless(0.0)).unwrap();
        let dir = tempdir().unwrap();
        write_outcome(dir.path(), &SizingOutcome::Infeasible(diagnosis)).unwrap();

        let contents = fs::read_to_string(dir.path().join(REPORT_FILE_NAME)).unwrap();
        assert!(contents.contains("status = \"infeasible\""));
        assert!(contents.contains("suspected_constraint = \"budget\""));
        assert!(!dir.path().join(COMPONENTS_FILE_NAME).exists());
    }

    #[test]
    fn test_write_outcome_solver_failure() {
        let dir = tempdir().unwrap();
        let outcome = SizingOutcome::SolverFailure {
            solver_status: "ReachedTimeLimit".into(),
        };
        write_outcome(dir.path(), &outcome).unwrap();

        let contents = fs::read_to_string(dir.path().join(REPORT_FILE_NAME)).unwrap();
        assert!(contents.contains("status = \"solver_failure\""));
        assert!(contents.contains("solver_status = \"ReachedTimeLimit\""));
    }
}
