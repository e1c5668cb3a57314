use tracing::warn;

use crate::error::InputShapeError;

use super::catalog::{LineIdx, PeriodIdx, PlanCatalog, ProductIdx};
use super::demand::DemandMatrix;
use super::tables::{CapacityRateTable, DemandTable, OperatingCalendar};

/// One run's fully resolved inputs: catalogs, per-day capacity rates,
/// operating days and normalized demand. Shape validation happens here,
/// before any period is solved.
#[derive(Debug, Clone)]
pub struct AllocationProblem {
    catalog: PlanCatalog,
    rates: Vec<f64>,
    operating_days: Vec<f64>,
    line_day_rates: Vec<f64>,
    demand: DemandMatrix,
}

impl AllocationProblem {
    pub fn build(
        rates: &CapacityRateTable,
        calendar: &OperatingCalendar,
        demand: &DemandTable,
    ) -> Result<Self, InputShapeError> {
        let catalog = PlanCatalog::resolve(rates, calendar)?;
        let num_lines = catalog.lines().len();

        for row in &rates.rows {
            if row.rates.len() != num_lines {
                return Err(InputShapeError::RaggedCapacityRow {
                    product: row.product.clone(),
                    expected: num_lines,
                    found: row.rates.len(),
                });
            }
        }

        let rate_values: Vec<f64> = rates
            .rows
            .iter()
            .flat_map(|row| {
                row.rates
                    .iter()
                    .map(|&rate| coerce_cell(rate, "capacity rate", &row.product))
            })
            .collect();

        let operating_days: Vec<f64> = calendar
            .entries
            .iter()
            .map(|entry| coerce_cell(entry.operating_days, "operating days", &entry.period))
            .collect();

        // Per-line sum of every product's daily rate. Multiplied by a
        // period's operating days this is the line's aggregate ceiling,
        // shared across products rather than capping each product on its own.
        let line_day_rates: Vec<f64> = (0..num_lines)
            .map(|line| {
                (0..catalog.products().len())
                    .map(|product| rate_values[product * num_lines + line])
                    .sum()
            })
            .collect();

        let demand = DemandMatrix::normalize(demand, &catalog);

        Ok(AllocationProblem {
            catalog,
            rates: rate_values,
            operating_days,
            line_day_rates,
            demand,
        })
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn rate(&self, product: ProductIdx, line: LineIdx) -> f64 {
        self.rates[product.get() * self.catalog.lines().len() + line.get()]
    }

    pub fn operating_days(&self, period: PeriodIdx) -> f64 {
        self.operating_days[period.get()]
    }

    /// CapacityQuantity(line, period): Σ over products of
    /// CapacityRate(product, line) × OperatingDays(period).
    pub fn line_capacity(&self, line: LineIdx, period: PeriodIdx) -> f64 {
        self.line_day_rates[line.get()] * self.operating_days[period.get()]
    }

    pub fn demand(&self) -> &DemandMatrix {
        &self.demand
    }

    pub fn demand_quantity(&self, product: ProductIdx, period: PeriodIdx) -> f64 {
        self.demand.quantity(product, period)
    }
}

fn coerce_cell(value: f64, column: &str, key: &str) -> f64 {
    if !value.is_finite() {
        warn!(column, key, "non-finite value coerced to 0");
        0.0
    } else if value < 0.0 {
        warn!(column, key, value, "negative value clamped to 0");
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{calendar_table, demand_table, rates_table};

    #[test]
    fn test_line_capacity_is_rate_times_operating_days() {
        let rates = rates_table(&["Line 1"], &[("P1", &[10.0])]);
        let calendar = calendar_table(&[("Jan", 5.0)]);
        let problem =
            AllocationProblem::build(&rates, &calendar, &DemandTable::default()).unwrap();

        assert_eq!(
            problem.line_capacity(LineIdx::new(0), PeriodIdx::new(0)),
            50.0
        );
    }

    #[test]
    fn test_line_capacity_sums_rates_across_products() {
        let rates = rates_table(&["Line 1"], &[("P1", &[10.0]), ("P2", &[30.0])]);
        let calendar = calendar_table(&[("Jan", 2.0)]);
        let problem =
            AllocationProblem::build(&rates, &calendar, &DemandTable::default()).unwrap();

        assert_eq!(
            problem.line_capacity(LineIdx::new(0), PeriodIdx::new(0)),
            80.0
        );
    }

    #[test]
    fn test_ragged_capacity_row_rejected() {
        let rates = rates_table(&["Line 1", "Line 2"], &[("P1", &[10.0])]);
        let calendar = calendar_table(&[("Jan", 5.0)]);

        let err =
            AllocationProblem::build(&rates, &calendar, &DemandTable::default()).unwrap_err();
        assert!(matches!(
            err,
            InputShapeError::RaggedCapacityRow {
                ref product,
                expected: 2,
                found: 1,
            } if product == "P1"
        ));
    }

    #[test]
    fn test_non_finite_rate_treated_as_zero() {
        let rates = rates_table(&["Line 1"], &[("P1", &[f64::NAN]), ("P2", &[10.0])]);
        let calendar = calendar_table(&[("Jan", 3.0)]);
        let problem =
            AllocationProblem::build(&rates, &calendar, &DemandTable::default()).unwrap();

        assert_eq!(problem.rate(ProductIdx::new(0), LineIdx::new(0)), 0.0);
        assert_eq!(
            problem.line_capacity(LineIdx::new(0), PeriodIdx::new(0)),
            30.0
        );
    }

    #[test]
    fn test_negative_operating_days_clamped() {
        let rates = rates_table(&["Line 1"], &[("P1", &[10.0])]);
        let calendar = calendar_table(&[("Jan", -4.0)]);
        let problem =
            AllocationProblem::build(&rates, &calendar, &DemandTable::default()).unwrap();

        assert_eq!(problem.operating_days(PeriodIdx::new(0)), 0.0);
        assert_eq!(
            problem.line_capacity(LineIdx::new(0), PeriodIdx::new(0)),
            0.0
        );
    }

    #[test]
    fn test_demand_normalized_through_build() {
        let rates = rates_table(&["Line 1"], &[("P1", &[10.0])]);
        let calendar = calendar_table(&[("Jan", 5.0)]);
        let demand = demand_table(&[("P1", "Jan", 8.0), ("P1", "Jan", 4.0)]);
        let problem = AllocationProblem::build(&rates, &calendar, &demand).unwrap();

        assert_eq!(
            problem.demand_quantity(ProductIdx::new(0), PeriodIdx::new(0)),
            12.0
        );
    }
}
