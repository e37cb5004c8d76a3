//! Provides a solver-independent representation of a mixed-integer linear program and the
//! interface through which it is solved.
//!
//! A [`LinearProgram`] minimises:
//!
//! f = c1*x1 + c2*x2 + ...
//!
//! subject to bounds on each `x` and a set of rows of the form:
//!
//! min <= a1*x1 + a2*x2 + ... <= max
use std::ops::{Bound, RangeBounds};

pub mod highs;
pub use self::highs::HighsSolver;

/// A decision variable in the program.
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(usize);

impl Variable {
    /// The index of the column for this variable
    pub fn index(self) -> usize {
        self.0
    }
}

/// The definition of a column (decision variable)
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// The coefficient of the variable in the objective
    pub cost: f64,
    /// The variable's minimum value
    pub min: f64,
    /// The variable's maximum value
    pub max: f64,
    /// Whether the variable must take an integer value
    pub is_integer: bool,
}

/// A constraint on a weighted sum of variables.
///
/// Often, rows will impose only a min or a max value, with the other set to infinity or minus
/// infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDefinition {
    /// The minimum value for the row
    pub min: f64,
    /// The maximum value for the row
    pub max: f64,
    /// The variables in the row and their coefficients
    pub terms: Vec<(Variable, f64)>,
}

/// A mixed-integer linear program to be minimised
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearProgram {
    columns: Vec<ColumnDefinition>,
    rows: Vec<RowDefinition>,
}

/// Convert a range into explicit lower and upper bounds
fn to_min_max<B: RangeBounds<f64>>(bounds: &B) -> (f64, f64) {
    let min = match bounds.start_bound() {
        Bound::Included(&x) | Bound::Excluded(&x) => x,
        Bound::Unbounded => f64::NEG_INFINITY,
    };
    let max = match bounds.end_bound() {
        Bound::Included(&x) | Bound::Excluded(&x) => x,
        Bound::Unbounded => f64::INFINITY,
    };

    (min, max)
}

impl LinearProgram {
    /// Add a continuous variable with the given objective coefficient and bounds
    pub fn add_column<B: RangeBounds<f64>>(&mut self, cost: f64, bounds: B) -> Variable {
        self.push_column(cost, &bounds, false)
    }

    /// Add an integer variable with the given objective coefficient and bounds
    pub fn add_integer_column<B: RangeBounds<f64>>(&mut self, cost: f64, bounds: B) -> Variable {
        self.push_column(cost, &bounds, true)
    }

    fn push_column<B: RangeBounds<f64>>(
        &mut self,
        cost: f64,
        bounds: &B,
        is_integer: bool,
    ) -> Variable {
        let (min, max) = to_min_max(bounds);
        self.columns.push(ColumnDefinition {
            cost,
            min,
            max,
            is_integer,
        });

        Variable(self.columns.len() - 1)
    }

    /// Add a row constraining a weighted sum of variables to the given bounds.
    ///
    /// Returns the index of the new row.
    pub fn add_row<B, I>(&mut self, bounds: B, terms: I) -> usize
    where
        B: RangeBounds<f64>,
        I: IntoIterator<Item = (Variable, f64)>,
    {
        let (min, max) = to_min_max(&bounds);
        let terms: Vec<_> = terms.into_iter().collect();
        assert!(
            terms.iter().all(|(var, _)| var.0 < self.columns.len()),
            "Row refers to a variable which is not in the program"
        );
        self.rows.push(RowDefinition { min, max, terms });

        self.rows.len() - 1
    }

    /// The columns of the program
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// The rows of the program
    pub fn rows(&self) -> &[RowDefinition] {
        &self.rows
    }

    /// Evaluate the objective for the given column values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value)
            .sum()
    }

    /// Evaluate the weighted sum of the given row for the given column values
    pub fn row_activity(&self, row: usize, values: &[f64]) -> f64 {
        self.rows[row]
            .terms
            .iter()
            .map(|(var, coeff)| coeff * values[var.0])
            .sum()
    }

    /// The largest magnitude of any coefficient multiplying an integer column in a row.
    ///
    /// Zero if no row refers to an integer column.
    pub fn largest_integer_coefficient(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| &row.terms)
            .filter(|(var, _)| self.columns[var.0].is_integer)
            .map(|(_, coeff)| coeff.abs())
            .fold(0.0, f64::max)
    }

    /// Whether the objective cannot decrease without limit over the feasible region.
    ///
    /// This holds when every variable with a non-zero cost is bounded in the direction which would
    /// decrease the objective.
    pub fn is_objective_bounded_below(&self) -> bool {
        self.columns.iter().all(|column| {
            (column.cost >= 0.0 || column.max.is_finite())
                && (column.cost <= 0.0 || column.min.is_finite())
        })
    }
}

/// The raw result of an optimal solve
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// The value of each column, in the order they were added
    pub columns: Vec<f64>,
    /// The value of the objective function at this solution
    pub objective_value: f64,
}

impl Solution {
    /// Get the value of a variable
    pub fn value(&self, var: Variable) -> f64 {
        self.columns[var.0]
    }
}

/// The outcome of a call to a solver, normalised across backends
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    /// A proven optimal solution was found
    Optimal(Solution),
    /// The solver proved that no feasible solution exists
    Infeasible,
    /// Any other status, e.g. unbounded, time limit reached or a solver error
    Other(String),
}

/// A MILP backend.
///
/// Implementations must never report a solution as optimal unless optimality was proven within
/// the backend's tolerances.
pub trait Solver {
    /// Solve the program, minimising its objective
    fn solve(&self, program: &LinearProgram) -> SolverOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_column_bounds() {
        let mut program = LinearProgram::default();
        let x = program.add_column(1.0, 0.0..);
        let y = program.add_integer_column(2.0, 0.0..=1.0);
        assert_eq!(x.index(), 0);
        assert_eq!(y.index(), 1);
        assert_eq!(
            program.columns()[0],
            ColumnDefinition {
                cost: 1.0,
                min: 0.0,
                max: f64::INFINITY,
                is_integer: false
            }
        );
        assert!(program.columns()[1].is_integer);
        assert_eq!(program.columns()[1].max, 1.0);
    }

    #[test]
    fn test_objective_and_row_activity() {
        let mut program = LinearProgram::default();
        let x = program.add_column(3.0, 0.0..);
        let y = program.add_column(-1.0, 0.0..=10.0);
        let row = program.add_row(..=5.0, [(x, 1.0), (y, 2.0)]);
        let values = [1.0, 2.0];
        assert_eq!(program.objective_value(&values), 1.0);
        assert_eq!(program.row_activity(row, &values), 5.0);
        assert_eq!(program.rows()[row].min, f64::NEG_INFINITY);
    }

    #[test]
    fn test_largest_integer_coefficient() {
        let mut program = LinearProgram::default();
        assert_eq!(program.largest_integer_coefficient(), 0.0);

        let x = program.add_column(1.0, 0.0..);
        let y = program.add_integer_column(1.0, 0.0..);
        program.add_row(..=0.0, [(x, -1e9), (y, 3.0)]);
        program.add_row(0.0.., [(y, -250.0)]);
        assert_eq!(program.largest_integer_coefficient(), 250.0);
    }

    #[test]
    fn test_is_objective_bounded_below() {
        let mut program = LinearProgram::default();
        program.add_column(1.0, 0.0..);
        program.add_column(-1.0, 0.0..=1.0);
        assert!(program.is_objective_bounded_below());

        program.add_column(-1.0, 0.0..);
        assert!(!program.is_objective_bounded_below());
    }

    #[test]
    #[should_panic(expected = "Row refers to a variable which is not in the program")]
    fn test_add_row_unknown_variable() {
        let mut program = LinearProgram::default();
        program.add_row(0.0.., [(Variable(3), 1.0)]);
    }
}
