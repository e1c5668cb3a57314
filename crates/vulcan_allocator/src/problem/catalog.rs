use fxhash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::InputShapeError;

use super::tables::{CapacityRateTable, OperatingCalendar};

macro_rules! catalog_index {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            pub const fn get(&self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

catalog_index!(ProductIdx);
catalog_index!(LineIdx);
catalog_index!(PeriodIdx);

/// The resolved product, line and period sets of one planning run. Products
/// and lines come from the capacity table (rows and columns, in order),
/// periods from the calendar. The sets are identical across every period of
/// the run.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    products: Vec<String>,
    lines: Vec<String>,
    periods: Vec<String>,
    product_lookup: FxHashMap<String, ProductIdx>,
    line_lookup: FxHashMap<String, LineIdx>,
    period_lookup: FxHashMap<String, PeriodIdx>,
}

impl PlanCatalog {
    pub fn resolve(
        rates: &CapacityRateTable,
        calendar: &OperatingCalendar,
    ) -> Result<Self, InputShapeError> {
        let mut line_lookup = FxHashMap::default();
        for (index, line) in rates.lines.iter().enumerate() {
            if line_lookup
                .insert(line.clone(), LineIdx::new(index))
                .is_some()
            {
                return Err(InputShapeError::DuplicateLine(line.clone()));
            }
        }

        let mut product_lookup = FxHashMap::default();
        for (index, row) in rates.rows.iter().enumerate() {
            if product_lookup
                .insert(row.product.clone(), ProductIdx::new(index))
                .is_some()
            {
                return Err(InputShapeError::DuplicateProduct(row.product.clone()));
            }
        }

        let mut period_lookup = FxHashMap::default();
        for (index, entry) in calendar.entries.iter().enumerate() {
            if period_lookup
                .insert(entry.period.clone(), PeriodIdx::new(index))
                .is_some()
            {
                return Err(InputShapeError::DuplicatePeriod(entry.period.clone()));
            }
        }

        Ok(PlanCatalog {
            products: rates.rows.iter().map(|row| row.product.clone()).collect(),
            lines: rates.lines.clone(),
            periods: calendar
                .entries
                .iter()
                .map(|entry| entry.period.clone())
                .collect(),
            product_lookup,
            line_lookup,
            period_lookup,
        })
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn product(&self, index: ProductIdx) -> &str {
        &self.products[index.get()]
    }

    pub fn line(&self, index: LineIdx) -> &str {
        &self.lines[index.get()]
    }

    pub fn period(&self, index: PeriodIdx) -> &str {
        &self.periods[index.get()]
    }

    pub fn product_idx(&self, label: &str) -> Option<ProductIdx> {
        self.product_lookup.get(label).copied()
    }

    pub fn line_idx(&self, label: &str) -> Option<LineIdx> {
        self.line_lookup.get(label).copied()
    }

    pub fn period_idx(&self, label: &str) -> Option<PeriodIdx> {
        self.period_lookup.get(label).copied()
    }

    pub fn product_indices(&self) -> impl Iterator<Item = ProductIdx> {
        (0..self.products.len()).map(ProductIdx::new)
    }

    pub fn line_indices(&self) -> impl Iterator<Item = LineIdx> {
        (0..self.lines.len()).map(LineIdx::new)
    }

    pub fn period_indices(&self) -> impl Iterator<Item = PeriodIdx> {
        (0..self.periods.len()).map(PeriodIdx::new)
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            products: self.products.clone(),
            lines: self.lines.clone(),
            periods: self.periods.clone(),
        }
    }
}

/// The catalog metadata record returned alongside allocation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogSummary {
    pub products: Vec<String>,
    pub lines: Vec<String>,
    pub periods: Vec<String>,
}
