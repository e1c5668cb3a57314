use crate::error::LpError;
use crate::problem::tables::{
    CalendarEntry, CapacityRateRow, CapacityRateTable, DemandRow, DemandTable, OperatingCalendar,
};
use crate::solver::lp::{LinearProgram, LpBackend, LpSolution};

pub fn rates_table(lines: &[&str], rows: &[(&str, &[f64])]) -> CapacityRateTable {
    CapacityRateTable {
        lines: lines.iter().map(|line| line.to_string()).collect(),
        rows: rows
            .iter()
            .map(|(product, rates)| CapacityRateRow {
                product: product.to_string(),
                rates: rates.to_vec(),
            })
            .collect(),
    }
}

pub fn calendar_table(entries: &[(&str, f64)]) -> OperatingCalendar {
    OperatingCalendar {
        entries: entries
            .iter()
            .map(|(period, operating_days)| CalendarEntry {
                period: period.to_string(),
                operating_days: *operating_days,
            })
            .collect(),
    }
}

pub fn demand_table(rows: &[(&str, &str, f64)]) -> DemandTable {
    DemandTable::from_rows(
        rows.iter()
            .map(|(product, period, quantity)| DemandRow::new(*product, *period, *quantity))
            .collect(),
    )
}

/// Backend that always fails, for error-propagation tests.
pub struct FailingBackend(pub LpError);

impl LpBackend for FailingBackend {
    fn solve(&self, _program: &LinearProgram) -> Result<LpSolution, LpError> {
        Err(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
