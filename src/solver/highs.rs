//! Solves programs with the HiGHS solver.
use super::{LinearProgram, Solution, Solver, SolverOutcome};
use ::highs::{Col, HighsModelStatus, Model, RowProblem as Problem, Sense};
use log::{debug, warn};
use std::time::Duration;

/// Default wall-clock limit on a single solve
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);

/// The default HiGHS tolerance on integrality, which is never loosened
const DEFAULT_MIP_FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// The smallest integrality tolerance HiGHS accepts
const MIN_MIP_FEASIBILITY_TOLERANCE: f64 = 1e-10;

/// Integrality tolerance for solving `program`.
///
/// An integer column within tolerance of zero, multiplied by any of its row coefficients, must stay
/// below half a unit. Otherwise a big-M link could let a type which is barely selected have whole
/// units installed.
pub fn mip_feasibility_tolerance(program: &LinearProgram) -> f64 {
    let largest = program.largest_integer_coefficient().max(1.0);
    let required = 0.5 / largest;
    if required < MIN_MIP_FEASIBILITY_TOLERANCE {
        warn!(
            "Coefficient of {largest} is too large for integrality to be enforced exactly; \
            the solution may be rejected"
        );
    }

    required.clamp(
        MIN_MIP_FEASIBILITY_TOLERANCE,
        DEFAULT_MIP_FEASIBILITY_TOLERANCE,
    )
}

/// A [`Solver`] backed by HiGHS
#[derive(Debug, Clone, PartialEq)]
pub struct HighsSolver {
    /// Maximum time to spend on a solve. Reaching it is never reported as optimal.
    pub time_limit: Duration,
    /// Relative gap between the best solution and the best bound at which the search stops
    pub mip_rel_gap: f64,
    /// Whether to print the solver's own log to the console
    pub log_to_console: bool,
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            mip_rel_gap: 0.0,
            log_to_console: false,
        }
    }
}

impl HighsSolver {
    /// Apply solver options to the model
    fn configure(&self, model: &mut Model, mip_feasibility_tolerance: f64) {
        model.set_option("time_limit", self.time_limit.as_secs_f64());
        model.set_option("mip_feasibility_tolerance", mip_feasibility_tolerance);
        model.set_option("mip_rel_gap", self.mip_rel_gap);
        model.set_option("output_flag", self.log_to_console);
        model.set_option("log_to_console", self.log_to_console);
    }
}

impl Solver for HighsSolver {
    fn solve(&self, program: &LinearProgram) -> SolverOutcome {
        let mut problem = Problem::default();

        // Add variables
        let cols: Vec<Col> = program
            .columns()
            .iter()
            .map(|column| {
                let bounds = column.min..=column.max;
                if column.is_integer {
                    problem.add_integer_column(column.cost, bounds)
                } else {
                    problem.add_column(column.cost, bounds)
                }
            })
            .collect();

        // Add constraints
        for row in program.rows() {
            let terms: Vec<(Col, f64)> = row
                .terms
                .iter()
                .map(|(var, coeff)| (cols[var.index()], *coeff))
                .collect();
            problem.add_row(row.min..=row.max, terms);
        }

        let tolerance = mip_feasibility_tolerance(program);
        let mut model = problem.optimise(Sense::Minimise);
        self.configure(&mut model, tolerance);

        debug!(
            "Solving with HiGHS: {} columns, {} rows, time limit {:?}, tolerance {tolerance}",
            program.columns().len(),
            program.rows().len(),
            self.time_limit
        );

        let solved = match model.try_solve() {
            Ok(solved) => solved,
            Err(status) => {
                warn!("HiGHS failed to run: {status:?}");
                return SolverOutcome::Other(format!("{status:?}"));
            }
        };

        match solved.status() {
            HighsModelStatus::Optimal => {
                let columns = solved.get_solution().columns().to_vec();
                let objective_value = program.objective_value(&columns);
                SolverOutcome::Optimal(Solution {
                    columns,
                    objective_value,
                })
            }
            HighsModelStatus::Infeasible => SolverOutcome::Infeasible,
            // Unboundedness is impossible if the objective is bounded below
            HighsModelStatus::UnboundedOrInfeasible if program.is_objective_bounded_below() => {
                SolverOutcome::Infeasible
            }
            status => SolverOutcome::Other(format!("{status:?}")),
        }
    }
}
