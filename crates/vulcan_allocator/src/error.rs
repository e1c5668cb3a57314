use thiserror::Error;

/// Structurally broken input tables, detected before any solve starts.
#[derive(Error, Debug)]
pub enum InputShapeError {
    #[error("duplicate line column '{0}' in capacity table")]
    DuplicateLine(String),
    #[error("duplicate product row '{0}' in capacity table")]
    DuplicateProduct(String),
    #[error("duplicate period '{0}' in calendar")]
    DuplicatePeriod(String),
    #[error("capacity row for '{product}' has {found} rates, expected {expected} (one per line)")]
    RaggedCapacityRow {
        product: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LpError {
    #[error("problem is infeasible")]
    Infeasible,
    #[error("objective is unbounded")]
    Unbounded,
    #[error("backend failure: {0}")]
    Backend(String),
}

/// A period's linear program could not be solved. Under this formulation the
/// all-zero point is always feasible, so this signals a logic or data
/// corruption bug rather than a business outcome, and it aborts the run.
#[derive(Error, Debug)]
#[error("solve failed for period '{period}': {source}")]
pub struct SolverError {
    pub period: String,
    #[source]
    pub source: LpError,
}

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error(transparent)]
    InputShape(#[from] InputShapeError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("baseline provider failed: {0}")]
    Baseline(#[from] anyhow::Error),
}
