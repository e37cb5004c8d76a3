//! Common routines for handling input data.
use crate::parameters::ParameterSet;
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod catalog;
use catalog::read_catalog;
pub mod project;
use project::read_project_parameters;

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a series of type `T`s from a CSV file.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = read_csv_internal(file_path).with_context(|| input_err_msg(file_path))?;
    ensure!(!vec.is_empty(), "CSV file {} is empty", file_path.display());

    Ok(vec)
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?
        .into_deserialize()
        .collect::<Result<Vec<T>, _>>()?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Load the parameters for a sizing from the specified model directory.
///
/// The parameters are validated before being returned.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn load_parameters<P: AsRef<Path>>(model_dir: P) -> Result<ParameterSet> {
    let model_dir = model_dir.as_ref();
    let project = read_project_parameters(model_dir)?;
    let catalog = read_catalog(model_dir)?;

    let parameters = ParameterSet { catalog, project };
    parameters.validate()?;

    Ok(parameters)
}
