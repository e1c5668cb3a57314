use rayon::iter::{IntoParallelIterator, ParallelIterator};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::baseline::BaselineProvider;
use crate::error::AllocationError;
use crate::metrics::{self, AllocationRow, FillRateRow, LineUtilizationRow};
use crate::problem::allocation_problem::AllocationProblem;
use crate::problem::catalog::{CatalogSummary, PeriodIdx};
use crate::problem::tables::{CapacityRateTable, DemandTable, OperatingCalendar};
use crate::solver::good_lp_backend::GoodLpBackend;
use crate::solver::lp::LpBackend;
use crate::solver::period_solver::{self, PeriodSolution};

/// Run-level tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    /// Solution values at or below this magnitude are dropped as solver
    /// noise rather than reported as allocations.
    pub positive_tolerance: f64,
    /// Solve periods on the rayon pool instead of one after another.
    pub parallel: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        EngineParams {
            positive_tolerance: 1e-9,
            parallel: true,
        }
    }
}

/// Full result of one allocation run: the three result tables plus the
/// resolved catalog record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AllocationOutcome {
    pub allocations: Vec<AllocationRow>,
    pub line_utilization: Vec<LineUtilizationRow>,
    pub fill_rates: Vec<FillRateRow>,
    pub catalog: CatalogSummary,
}

/// Per-period LP allocation over a fixed product/line/period catalog. Pure
/// with respect to its inputs: every run resolves fresh tables and carries
/// no state across invocations.
pub struct AllocationEngine<B = GoodLpBackend> {
    backend: B,
    params: EngineParams,
}

impl AllocationEngine<GoodLpBackend> {
    pub fn new() -> Self {
        AllocationEngine {
            backend: GoodLpBackend,
            params: EngineParams::default(),
        }
    }
}

impl Default for AllocationEngine<GoodLpBackend> {
    fn default() -> Self {
        AllocationEngine::new()
    }
}

impl<B: LpBackend> AllocationEngine<B> {
    pub fn with_backend(backend: B, params: EngineParams) -> Self {
        AllocationEngine { backend, params }
    }

    pub fn params(&self) -> EngineParams {
        self.params
    }

    /// Runs an allocation against the provider's tables. A caller-supplied
    /// demand table replaces the provider's default demand; rates and
    /// calendar always come from the provider.
    pub fn run(
        &self,
        baseline: &dyn BaselineProvider,
        demand: Option<&DemandTable>,
    ) -> Result<AllocationOutcome, AllocationError> {
        let rates = baseline.capacity_rates()?;
        let calendar = baseline.calendar()?;
        let demand = match demand {
            Some(table) => table.clone(),
            None => baseline.default_demand()?,
        };
        self.run_tables(&rates, &calendar, &demand)
    }

    pub fn run_tables(
        &self,
        rates: &CapacityRateTable,
        calendar: &OperatingCalendar,
        demand: &DemandTable,
    ) -> Result<AllocationOutcome, AllocationError> {
        let problem = AllocationProblem::build(rates, calendar, demand)?;
        let solutions = self.solve_periods(&problem)?;
        let (allocations, line_utilization, fill_rates) =
            metrics::aggregate(&problem, &solutions);

        info!(
            backend = self.backend.name(),
            periods = solutions.len(),
            allocations = allocations.len(),
            total_allocated = solutions.iter().map(PeriodSolution::objective).sum::<f64>(),
            "allocation run complete"
        );

        Ok(AllocationOutcome {
            allocations,
            line_utilization,
            fill_rates,
            catalog: problem.catalog().summary(),
        })
    }

    /// Periods share no state, so they are solved as an independent map.
    /// Collection is index-ordered either way: output order never depends
    /// on completion order.
    fn solve_periods(
        &self,
        problem: &AllocationProblem,
    ) -> Result<Vec<PeriodSolution>, AllocationError> {
        let num_periods = problem.catalog().periods().len();
        let solve = |period: usize| {
            period_solver::solve_period(
                problem,
                PeriodIdx::new(period),
                &self.backend,
                self.params.positive_tolerance,
            )
        };

        let solutions: Result<Vec<_>, _> = if self.params.parallel {
            (0..num_periods).into_par_iter().map(solve).collect()
        } else {
            (0..num_periods).map(solve).collect()
        };
        solutions.map_err(AllocationError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::InMemoryBaseline;
    use crate::error::LpError;
    use crate::test_utils::{FailingBackend, calendar_table, demand_table, rates_table};

    fn baseline() -> InMemoryBaseline {
        InMemoryBaseline {
            rates: rates_table(&["Line 1"], &[("P1", &[10.0])]),
            calendar: calendar_table(&[("Jan", 5.0)]),
            demand: demand_table(&[("P1", "Jan", 30.0)]),
        }
    }

    #[test]
    fn test_run_with_default_demand() {
        let outcome = AllocationEngine::new().run(&baseline(), None).unwrap();

        assert_eq!(outcome.allocations.len(), 1);
        assert!((outcome.allocations[0].quantity - 30.0).abs() < 1e-6);
        assert!((outcome.line_utilization[0].utilization - 0.6).abs() < 1e-6);
        assert!((outcome.fill_rates[0].fill_rate.unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(outcome.catalog.products, ["P1"]);
        assert_eq!(outcome.catalog.lines, ["Line 1"]);
        assert_eq!(outcome.catalog.periods, ["Jan"]);
    }

    #[test]
    fn test_demand_override_replaces_default() {
        let override_demand = demand_table(&[("P1", "Jan", 80.0)]);
        let outcome = AllocationEngine::new()
            .run(&baseline(), Some(&override_demand))
            .unwrap();

        // capacity 50 caps the overridden demand of 80
        assert!((outcome.allocations[0].quantity - 50.0).abs() < 1e-6);
        assert!((outcome.fill_rates[0].fill_rate.unwrap() - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_backend_failure_aborts_whole_run() {
        let engine = AllocationEngine::with_backend(
            FailingBackend(LpError::Infeasible),
            EngineParams::default(),
        );

        let err = engine.run(&baseline(), None).unwrap_err();
        assert!(matches!(err, AllocationError::Solver(_)));
    }

    #[test]
    fn test_empty_tables_produce_empty_outcome() {
        let outcome = AllocationEngine::new()
            .run(&InMemoryBaseline::default(), None)
            .unwrap();

        assert!(outcome.allocations.is_empty());
        assert!(outcome.line_utilization.is_empty());
        assert!(outcome.fill_rates.is_empty());
        assert!(outcome.catalog.products.is_empty());
    }

    #[test]
    fn test_parallel_and_sequential_totals_agree() {
        let rates = rates_table(
            &["Line 1", "Line 2"],
            &[("P1", &[4.0, 2.0]), ("P2", &[3.0, 5.0])],
        );
        let calendar = calendar_table(&[("Jan", 20.0), ("Feb", 18.0), ("Mar", 21.0)]);
        let demand = demand_table(&[
            ("P1", "Jan", 100.0),
            ("P2", "Jan", 300.0),
            ("P1", "Feb", 250.0),
            ("P2", "Mar", 40.0),
        ]);

        let parallel = AllocationEngine::new()
            .run_tables(&rates, &calendar, &demand)
            .unwrap();
        let sequential = AllocationEngine::with_backend(
            GoodLpBackend,
            EngineParams {
                parallel: false,
                ..EngineParams::default()
            },
        )
        .run_tables(&rates, &calendar, &demand)
        .unwrap();

        for (a, b) in parallel
            .line_utilization
            .iter()
            .zip(&sequential.line_utilization)
        {
            assert_eq!(a.period, b.period);
            assert_eq!(a.line, b.line);
            assert!((a.produced - b.produced).abs() < 1e-9);
        }
    }

    #[test]
    fn test_identical_inputs_give_identical_totals() {
        let engine = AllocationEngine::new();
        let provider = baseline();

        let first = engine.run(&provider, None).unwrap();
        let second = engine.run(&provider, None).unwrap();

        let total = |outcome: &AllocationOutcome| {
            outcome
                .allocations
                .iter()
                .map(|row| row.quantity)
                .sum::<f64>()
        };
        assert_eq!(total(&first), total(&second));
    }
}
