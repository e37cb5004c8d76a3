//! Functionality for running a single sizing.
use crate::diagnostics::{InfeasibilityReport, diagnose_infeasibility};
use crate::model::build_model;
use crate::parameters::ParameterSet;
use crate::report::{Report, extract_report};
use crate::solver::{Solver, SolverOutcome};
use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Serialize;

/// The outcome of a sizing run.
///
/// Infeasibility and solver failures are expected outcomes rather than errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SizingOutcome {
    /// An optimal sizing was found
    Sized(Report),
    /// No sizing satisfies the constraints
    Infeasible(InfeasibilityReport),
    /// The solver did not prove optimality or infeasibility, e.g. because it ran out of time, or
    /// its solution broke integrality or the type selection rules
    SolverFailure {
        /// The status reported by the solver
        solver_status: String,
    },
}

/// Size a system for the given parameters.
///
/// An error is returned if the parameters are invalid, in which case the solver is not called.
/// Anything going wrong in the solver is reported as [`SizingOutcome::SolverFailure`] instead.
///
/// # Arguments
///
/// * `parameters` - The catalog and project parameters
/// * `solver` - The MILP backend to use
pub fn run_sizing<S: Solver + ?Sized>(
    parameters: &ParameterSet,
    solver: &S,
) -> Result<SizingOutcome> {
    parameters.validate().context("Invalid parameters")?;

    let model = build_model(parameters)?;
    let outcome = match solver.solve(&model.program) {
        SolverOutcome::Optimal(solution) => {
            info!(
                "Found optimal sizing with total cost {}",
                solution.objective_value
            );
            match extract_report(&model, &solution, parameters) {
                Ok(report) => SizingOutcome::Sized(report),
                Err(err) => {
                    let solver_status = format!("Invalid solution: {err:#}");
                    error!("Solver returned an invalid solution: {err:#}");
                    SizingOutcome::SolverFailure { solver_status }
                }
            }
        }
        SolverOutcome::Infeasible => {
            let diagnosis = diagnose_infeasibility(parameters, model.z_score)?;
            warn!("Problem is infeasible: {}", diagnosis.message);
            SizingOutcome::Infeasible(diagnosis)
        }
        SolverOutcome::Other(solver_status) => {
            error!("Solver did not find a solution: {solver_status}");
            SizingOutcome::SolverFailure { solver_status }
        }
    };

    Ok(outcome)
}
