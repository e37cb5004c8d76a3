//! Sizing of hybrid solar-plus-storage systems.
//!
//! Given a catalog of panel, battery and inverter types and a set of project parameters, a
//! mixed-integer linear program is built and solved to find the cheapest system meeting a daily
//! energy demand at a given confidence level.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod component;
pub mod diagnostics;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod parameters;
pub mod report;
pub mod settings;
pub mod sizing;
pub mod solver;
pub mod stochastic;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the config dir for the program.
///
/// # Panics
///
/// If the user's config dir cannot be determined on this platform.
pub fn get_solar_sizing_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        panic!("Could not get config dir for your platform");
    };
    config_dir.push("solar-sizing");

    config_dir
}
