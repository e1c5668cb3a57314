use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Capacity rate table: one row per product, one rate column per line.
/// A rate is the maximum producible quantity of the product on the line per
/// operating day; row order fixes the product catalog, column order the line
/// catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CapacityRateTable {
    pub lines: Vec<String>,
    pub rows: Vec<CapacityRateRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CapacityRateRow {
    pub product: String,
    /// Aligned with the table's `lines` header.
    pub rates: Vec<f64>,
}

/// Operating-day calendar; entry order fixes the period catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OperatingCalendar {
    pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalendarEntry {
    pub period: String,
    pub operating_days: f64,
}

/// Long-form demand: one row per (product, period) observation. Rows may
/// repeat a pair; the normalizer sums them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DemandTable {
    pub rows: Vec<DemandRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DemandRow {
    pub product: String,
    pub period: String,
    pub quantity: f64,
}

impl DemandTable {
    pub fn from_rows(rows: Vec<DemandRow>) -> Self {
        DemandTable { rows }
    }
}

impl DemandRow {
    pub fn new(product: impl Into<String>, period: impl Into<String>, quantity: f64) -> Self {
        DemandRow {
            product: product.into(),
            period: period.into(),
            quantity,
        }
    }
}
