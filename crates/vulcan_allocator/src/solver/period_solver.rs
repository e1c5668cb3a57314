use tracing::{debug, instrument};

use crate::error::SolverError;
use crate::problem::allocation_problem::AllocationProblem;
use crate::problem::catalog::{LineIdx, PeriodIdx, ProductIdx};

use super::lp::{LinearProgram, LpBackend, VariableId};

/// One solved period: the strictly-positive allocation cells plus the raw
/// per-line production sums utilization is computed from.
#[derive(Debug, Clone)]
pub struct PeriodSolution {
    period: PeriodIdx,
    cells: Vec<AllocationCell>,
    produced_by_line: Vec<f64>,
    objective: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationCell {
    pub product: ProductIdx,
    pub line: LineIdx,
    pub quantity: f64,
}

impl PeriodSolution {
    pub fn period(&self) -> PeriodIdx {
        self.period
    }

    pub fn cells(&self) -> &[AllocationCell] {
        &self.cells
    }

    pub fn produced_by_line(&self) -> &[f64] {
        &self.produced_by_line
    }

    /// Total quantity produced in the period — the optimal objective value.
    pub fn objective(&self) -> f64 {
        self.objective
    }
}

/// Formulates and solves one period's allocation program: one quantity
/// variable per (product, line) pair, a shared-ceiling constraint per line,
/// a demand constraint per product, maximizing total quantity produced.
///
/// Zero capacity or zero demand makes the optimum trivially zero and yields
/// an empty cell list; a backend failure is fatal for the run.
#[instrument(skip_all, fields(period = %problem.catalog().period(period)))]
pub fn solve_period<B: LpBackend + ?Sized>(
    problem: &AllocationProblem,
    period: PeriodIdx,
    backend: &B,
    positive_tolerance: f64,
) -> Result<PeriodSolution, SolverError> {
    let catalog = problem.catalog();
    let num_products = catalog.products().len();
    let num_lines = catalog.lines().len();

    if num_products == 0 || num_lines == 0 {
        return Ok(PeriodSolution {
            period,
            cells: Vec::new(),
            produced_by_line: vec![0.0; num_lines],
            objective: 0.0,
        });
    }

    let mut program = LinearProgram::new();
    let variables: Vec<VariableId> = (0..num_products * num_lines)
        .map(|_| program.add_variable(1.0))
        .collect();
    let variable = |product: usize, line: usize| variables[product * num_lines + line];

    // Every pair keeps its variable even at a zero rate: the aggregate line
    // ceiling, not the individual rate, bounds an assignment.
    for line in 0..num_lines {
        let terms = (0..num_products)
            .map(|product| (variable(product, line), 1.0))
            .collect();
        program.add_upper_bound(terms, problem.line_capacity(LineIdx::new(line), period));
    }
    for product in 0..num_products {
        let terms = (0..num_lines)
            .map(|line| (variable(product, line), 1.0))
            .collect();
        program.add_upper_bound(
            terms,
            problem.demand_quantity(ProductIdx::new(product), period),
        );
    }

    let solution = backend.solve(&program).map_err(|source| SolverError {
        period: catalog.period(period).to_owned(),
        source,
    })?;

    let mut cells = Vec::new();
    let mut produced_by_line = vec![0.0; num_lines];
    for product in 0..num_products {
        for line in 0..num_lines {
            let quantity = solution.value(variable(product, line));
            produced_by_line[line] += quantity;
            if quantity > positive_tolerance {
                cells.push(AllocationCell {
                    product: ProductIdx::new(product),
                    line: LineIdx::new(line),
                    quantity,
                });
            }
        }
    }

    debug!(
        objective = solution.objective(),
        cells = cells.len(),
        "period solved"
    );

    Ok(PeriodSolution {
        period,
        cells,
        produced_by_line,
        objective: solution.objective(),
    })
}
