use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use vulcan_allocator::baseline::BaselineProvider;
use vulcan_allocator::problem::tables::{
    CalendarEntry, CapacityRateRow, CapacityRateTable, DemandRow, DemandTable, OperatingCalendar,
};

/// Baseline tables loaded from a directory of CSV files:
///
/// - `rates.csv` — product key column followed by one column per line;
/// - `calendar.csv` — period label column followed by the operating days;
/// - `demand.csv` — wide: product key column followed by one column per
///   period, melted to long form.
pub struct CsvBaseline {
    dir: PathBuf,
}

impl CsvBaseline {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvBaseline { dir: dir.into() }
    }
}

impl BaselineProvider for CsvBaseline {
    fn capacity_rates(&self) -> Result<CapacityRateTable, Error> {
        let path = self.dir.join("rates.csv");
        let mut reader = open(&path)?;
        let lines: Vec<String> = reader.headers()?.iter().skip(1).map(str::to_owned).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(CapacityRateRow {
                product: record.get(0).unwrap_or_default().to_owned(),
                rates: record.iter().skip(1).map(parse_cell).collect(),
            });
        }
        Ok(CapacityRateTable { lines, rows })
    }

    fn calendar(&self) -> Result<OperatingCalendar, Error> {
        let path = self.dir.join("calendar.csv");
        let mut reader = open(&path)?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            entries.push(CalendarEntry {
                period: record.get(0).unwrap_or_default().to_owned(),
                operating_days: parse_cell(record.get(1).unwrap_or_default()),
            });
        }
        Ok(OperatingCalendar { entries })
    }

    fn default_demand(&self) -> Result<DemandTable, Error> {
        read_wide_demand(&self.dir.join("demand.csv"))
    }
}

/// Reads a wide demand CSV (product key column plus one column per period)
/// into long-form rows.
pub fn read_wide_demand(path: &Path) -> Result<DemandTable, Error> {
    let mut reader = open(path)?;
    let periods: Vec<String> = reader.headers()?.iter().skip(1).map(str::to_owned).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let product = record.get(0).unwrap_or_default().to_owned();
        for (index, period) in periods.iter().enumerate() {
            rows.push(DemandRow::new(
                product.clone(),
                period.clone(),
                parse_cell(record.get(index + 1).unwrap_or_default()),
            ));
        }
    }
    Ok(DemandTable::from_rows(rows))
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, Error> {
    csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))
}

/// Unparseable numeric cells become NaN so the engine's lenient coercion
/// policy decides what happens to them.
fn parse_cell(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}
