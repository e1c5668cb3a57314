//! Minimal linear-programming surface the allocation formulation is written
//! against: non-negative continuous variables with objective weights, and
//! `Σ coeff·x ≤ bound` constraints under a maximizing solve. Any conforming
//! LP binding can sit behind [`LpBackend`] without the formulation changing.

use crate::error::LpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(usize);

impl VariableId {
    pub const fn get(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    objective_weights: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

#[derive(Debug, Clone)]
pub struct LinearConstraint {
    terms: Vec<(VariableId, f64)>,
    upper_bound: f64,
}

impl LinearConstraint {
    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }
}

impl LinearProgram {
    pub fn new() -> Self {
        LinearProgram::default()
    }

    /// Adds a non-negative continuous variable with the given weight in the
    /// maximized objective.
    pub fn add_variable(&mut self, objective_weight: f64) -> VariableId {
        let id = VariableId(self.objective_weights.len());
        self.objective_weights.push(objective_weight);
        id
    }

    /// Constrains `Σ coeff·x` over `terms` to stay at or below `upper_bound`.
    pub fn add_upper_bound(&mut self, terms: Vec<(VariableId, f64)>, upper_bound: f64) {
        self.constraints.push(LinearConstraint { terms, upper_bound });
    }

    pub fn num_variables(&self) -> usize {
        self.objective_weights.len()
    }

    pub fn objective_weights(&self) -> &[f64] {
        &self.objective_weights
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }
}

/// Optimal variable values of a solved program, one per added variable.
#[derive(Debug, Clone)]
pub struct LpSolution {
    values: Vec<f64>,
    objective: f64,
}

impl LpSolution {
    pub fn new(values: Vec<f64>, objective: f64) -> Self {
        LpSolution { values, objective }
    }

    pub fn value(&self, variable: VariableId) -> f64 {
        self.values[variable.get()]
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }
}

/// A maximizing LP solver.
///
/// When several assignments reach the same optimum, the backend's pivoting
/// order decides which one comes back; callers may rely on the objective
/// value and constraint satisfaction only, never on a particular optimal
/// split.
pub trait LpBackend: Send + Sync {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, LpError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
