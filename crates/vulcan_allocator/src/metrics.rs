use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::allocation_problem::AllocationProblem;
use crate::solver::period_solver::PeriodSolution;

/// One reported assignment of a product to a line within a period. Only
/// strictly positive quantities appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AllocationRow {
    pub period: String,
    pub product: String,
    pub line: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineUtilizationRow {
    pub period: String,
    pub line: String,
    pub produced: f64,
    pub capacity: f64,
    /// produced / capacity, or 0 when the line has no capacity this period.
    pub utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FillRateRow {
    pub period: String,
    pub product: String,
    pub produced: f64,
    pub demand: f64,
    /// produced / demand; absent when there was no demand to fill.
    pub fill_rate: Option<f64>,
}

/// Derives the utilization and fill-rate tables from the solved periods.
/// Utilization sums the raw per-line solution values; fill rates sum the
/// reported (strictly-positive) allocation cells, cover every catalog
/// (period, product) pair and close with the retained off-catalog demand
/// rows, which no allocation can ever reach.
pub(crate) fn aggregate(
    problem: &AllocationProblem,
    solutions: &[PeriodSolution],
) -> (
    Vec<AllocationRow>,
    Vec<LineUtilizationRow>,
    Vec<FillRateRow>,
) {
    let catalog = problem.catalog();
    let num_products = catalog.products().len();
    let num_periods = catalog.periods().len();

    let mut allocations = Vec::new();
    let mut utilization = Vec::with_capacity(num_periods * catalog.lines().len());
    let mut produced_by_product = vec![0.0; num_periods * num_products];

    for solution in solutions {
        let period = solution.period();
        for cell in solution.cells() {
            allocations.push(AllocationRow {
                period: catalog.period(period).to_owned(),
                product: catalog.product(cell.product).to_owned(),
                line: catalog.line(cell.line).to_owned(),
                quantity: cell.quantity,
            });
            produced_by_product[period.get() * num_products + cell.product.get()] +=
                cell.quantity;
        }

        for line in catalog.line_indices() {
            let produced = solution.produced_by_line()[line.get()];
            let capacity = problem.line_capacity(line, period);
            utilization.push(LineUtilizationRow {
                period: catalog.period(period).to_owned(),
                line: catalog.line(line).to_owned(),
                produced,
                capacity,
                utilization: if capacity > 0.0 { produced / capacity } else { 0.0 },
            });
        }
    }

    let off_catalog = problem.demand().off_catalog();
    let mut fill_rates = Vec::with_capacity(num_periods * num_products + off_catalog.len());
    for period in catalog.period_indices() {
        for product in catalog.product_indices() {
            let demand = problem.demand_quantity(product, period);
            let produced = produced_by_product[period.get() * num_products + product.get()];
            fill_rates.push(FillRateRow {
                period: catalog.period(period).to_owned(),
                product: catalog.product(product).to_owned(),
                produced,
                demand,
                fill_rate: (demand > 0.0).then(|| produced / demand),
            });
        }
    }
    for cell in off_catalog {
        fill_rates.push(FillRateRow {
            period: cell.period.clone(),
            product: cell.product.clone(),
            produced: 0.0,
            demand: cell.quantity,
            fill_rate: (cell.quantity > 0.0).then_some(0.0),
        });
    }

    (allocations, utilization, fill_rates)
}
