//! Builds the mixed-integer program for sizing a hybrid system.
//!
//! For every class of component and every type in the catalog there is an integer quantity
//! variable and a binary selection variable. The objective is the total (capital plus interest)
//! cost. See [`constraints`] for the constraints.
use crate::component::ComponentClass;
use crate::finance::{interest_factor, iter_lifetime_unit_costs};
use crate::parameters::ParameterSet;
use crate::solver::{LinearProgram, Variable};
use crate::stochastic::z_score;
use crate::units::{Dimensionless, Money};
use anyhow::Result;
use indexmap::IndexMap;
use log::debug;
use strum::Display;

pub mod constraints;
use constraints::add_constraints;
pub use constraints::ConstraintKind;

/// What a decision variable represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum VariableKind {
    /// Number of units of the type to install
    Quantity,
    /// Whether the type is the one chosen for its class
    Selection,
}

/// A key for a [`VariableMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableKey {
    /// The class of component
    pub class: ComponentClass,
    /// The position of the type in the catalog for its class
    pub type_index: usize,
    /// What the variable represents
    pub kind: VariableKind,
}

impl VariableKey {
    /// Create a new [`VariableKey`]
    pub fn new(class: ComponentClass, type_index: usize, kind: VariableKind) -> Self {
        Self {
            class,
            type_index,
            kind,
        }
    }
}

/// A map for easy lookup of variables in the problem.
///
/// The entries are ordered (see [`IndexMap`]) in the order the columns were added.
#[derive(Debug, Default)]
pub struct VariableMap(IndexMap<VariableKey, Variable>);

impl VariableMap {
    /// Get the [`Variable`] corresponding to the given parameters.
    pub fn get(&self, class: ComponentClass, type_index: usize, kind: VariableKind) -> Variable {
        *self
            .0
            .get(&VariableKey::new(class, type_index, kind))
            .expect("No variable found for given params")
    }

    /// Iterate over the variables of the given kind for one class, in catalog order
    pub fn iter_class(
        &self,
        class: ComponentClass,
        kind: VariableKind,
    ) -> impl Iterator<Item = (usize, Variable)> + '_ {
        self.0
            .iter()
            .filter(move |(key, _)| key.class == class && key.kind == kind)
            .map(|(key, var)| (key.type_index, *var))
    }

    /// Iterate over all keys and variables
    pub fn iter(&self) -> impl Iterator<Item = (&VariableKey, &Variable)> {
        self.0.iter()
    }

    fn insert(&mut self, key: VariableKey, var: Variable) {
        let existing = self.0.insert(key, var).is_some();
        assert!(!existing, "Duplicate entry for var");
    }
}

/// The optimisation model for a sizing problem, ready to be solved
#[derive(Debug)]
pub struct SizingModel {
    /// The mixed-integer program
    pub program: LinearProgram,
    /// The variables of the program
    pub variables: VariableMap,
    /// What each row of the program represents, in row order
    pub constraints: Vec<ConstraintKind>,
    /// The z-score for the confidence level
    pub z_score: Dimensionless,
    /// The big-M bound on the quantity of each type, keyed by class and type index
    pub big_m: IndexMap<(ComponentClass, usize), f64>,
}

/// Largest number of units of a type which could be afforded on its own within the budget.
///
/// Any feasible quantity is no larger than this, so it is a valid big-M for linking the quantity
/// to the type's selection variable.
pub fn big_m(total_budget: Money, unit_total_cost: Money) -> f64 {
    (total_budget / unit_total_cost).value().floor()
}

/// Build the optimisation model.
///
/// The model is built even if it is infeasible; infeasibility is for the solver to report.
/// `parameters` must already have been validated.
pub fn build_model(parameters: &ParameterSet) -> Result<SizingModel> {
    let z = z_score(parameters.project.confidence_level)?;
    debug!(
        "z-score for confidence level {}: {z}",
        parameters.project.confidence_level
    );

    let mut program = LinearProgram::default();
    let (variables, big_m) = add_variables(&mut program, parameters);
    let constraints = add_constraints(&mut program, &variables, &big_m, parameters, z);

    debug!(
        "Built sizing model with {} variables and {} constraints",
        program.columns().len(),
        program.rows().len()
    );

    Ok(SizingModel {
        program,
        variables,
        constraints,
        z_score: z,
        big_m,
    })
}

/// Add quantity and selection variables for every type in the catalog.
///
/// The cost coefficient of each quantity variable is its lifetime cost including interest.
fn add_variables(
    program: &mut LinearProgram,
    parameters: &ParameterSet,
) -> (VariableMap, IndexMap<(ComponentClass, usize), f64>) {
    let total_cost_factor = Dimensionless(1.0) + interest_factor(&parameters.project);

    let mut variables = VariableMap::default();
    let mut big_ms = IndexMap::new();
    for (class, type_index, unit_cost) in iter_lifetime_unit_costs(parameters) {
        let unit_total_cost = unit_cost * total_cost_factor;
        let quantity = program.add_integer_column(unit_total_cost.value(), 0.0..);
        let selection = program.add_integer_column(0.0, 0.0..=1.0);

        variables.insert(
            VariableKey::new(class, type_index, VariableKind::Quantity),
            quantity,
        );
        variables.insert(
            VariableKey::new(class, type_index, VariableKind::Selection),
            selection,
        );

        let m = big_m(parameters.project.total_budget, unit_total_cost);
        debug!("Big-M for {class} type {type_index}: {m}");
        big_ms.insert((class, type_index), m);
    }

    (variables, big_ms)
}
