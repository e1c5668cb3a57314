use fxhash::FxHashMap;
use tracing::warn;

use super::catalog::{PeriodIdx, PlanCatalog, ProductIdx};
use super::tables::DemandTable;

/// Dense product × period demand, normalized from long-form rows: duplicate
/// (product, period) rows are summed and missing combinations default to
/// zero. Rows naming a product or period outside the catalogs are retained
/// separately — they never reach the solver but still surface in fill-rate
/// reporting.
#[derive(Debug, Clone)]
pub struct DemandMatrix {
    num_periods: usize,
    quantities: Vec<f64>,
    off_catalog: Vec<DemandCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemandCell {
    pub product: String,
    pub period: String,
    pub quantity: f64,
}

impl DemandMatrix {
    pub fn normalize(table: &DemandTable, catalog: &PlanCatalog) -> Self {
        let num_products = catalog.products().len();
        let num_periods = catalog.periods().len();

        let mut quantities = vec![0.0; num_products * num_periods];
        let mut off_catalog: FxHashMap<(String, String), f64> = FxHashMap::default();

        for row in &table.rows {
            let quantity = coerce_quantity(row.quantity, &row.product, &row.period);
            match (
                catalog.product_idx(&row.product),
                catalog.period_idx(&row.period),
            ) {
                (Some(product), Some(period)) => {
                    quantities[product.get() * num_periods + period.get()] += quantity;
                }
                _ => {
                    *off_catalog
                        .entry((row.period.clone(), row.product.clone()))
                        .or_insert(0.0) += quantity;
                }
            }
        }

        let mut off_catalog: Vec<DemandCell> = off_catalog
            .into_iter()
            .map(|((period, product), quantity)| DemandCell {
                product,
                period,
                quantity,
            })
            .collect();
        off_catalog.sort_by(|a, b| (&a.period, &a.product).cmp(&(&b.period, &b.product)));

        DemandMatrix {
            num_periods,
            quantities,
            off_catalog,
        }
    }

    pub fn quantity(&self, product: ProductIdx, period: PeriodIdx) -> f64 {
        self.quantities[product.get() * self.num_periods + period.get()]
    }

    pub fn off_catalog(&self) -> &[DemandCell] {
        &self.off_catalog
    }
}

/// Lenient-input policy: demand quantities must be finite and non-negative;
/// anything else becomes zero with a warning rather than an error.
fn coerce_quantity(quantity: f64, product: &str, period: &str) -> f64 {
    if !quantity.is_finite() {
        warn!(product, period, "non-finite demand quantity coerced to 0");
        0.0
    } else if quantity < 0.0 {
        warn!(
            product,
            period, quantity, "negative demand quantity clamped to 0"
        );
        0.0
    } else {
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{calendar_table, demand_table, rates_table};

    fn catalog() -> PlanCatalog {
        let rates = rates_table(&["Line 1", "Line 2"], &[("P1", &[1.0, 1.0]), ("P2", &[1.0, 1.0])]);
        let calendar = calendar_table(&[("Jan", 22.0), ("Feb", 20.0)]);
        PlanCatalog::resolve(&rates, &calendar).unwrap()
    }

    #[test]
    fn test_duplicate_rows_summed() {
        let catalog = catalog();
        let table = demand_table(&[("P1", "Jan", 10.0), ("P1", "Jan", 5.0)]);

        let matrix = DemandMatrix::normalize(&table, &catalog);

        let p1 = catalog.product_idx("P1").unwrap();
        let jan = catalog.period_idx("Jan").unwrap();
        assert_eq!(matrix.quantity(p1, jan), 15.0);
    }

    #[test]
    fn test_missing_combinations_default_to_zero() {
        let catalog = catalog();
        let table = demand_table(&[("P1", "Jan", 10.0)]);

        let matrix = DemandMatrix::normalize(&table, &catalog);

        let p2 = catalog.product_idx("P2").unwrap();
        let feb = catalog.period_idx("Feb").unwrap();
        assert_eq!(matrix.quantity(p2, feb), 0.0);
    }

    #[test]
    fn test_negative_quantity_clamped() {
        let catalog = catalog();
        let table = demand_table(&[("P1", "Jan", -7.0)]);

        let matrix = DemandMatrix::normalize(&table, &catalog);

        let p1 = catalog.product_idx("P1").unwrap();
        let jan = catalog.period_idx("Jan").unwrap();
        assert_eq!(matrix.quantity(p1, jan), 0.0);
    }

    #[test]
    fn test_non_finite_quantity_coerced() {
        let catalog = catalog();
        let table = demand_table(&[
            ("P1", "Jan", f64::NAN),
            ("P1", "Feb", f64::INFINITY),
            ("P2", "Jan", 3.0),
        ]);

        let matrix = DemandMatrix::normalize(&table, &catalog);

        let p1 = catalog.product_idx("P1").unwrap();
        let p2 = catalog.product_idx("P2").unwrap();
        let jan = catalog.period_idx("Jan").unwrap();
        let feb = catalog.period_idx("Feb").unwrap();
        assert_eq!(matrix.quantity(p1, jan), 0.0);
        assert_eq!(matrix.quantity(p1, feb), 0.0);
        assert_eq!(matrix.quantity(p2, jan), 3.0);
    }

    #[test]
    fn test_off_catalog_rows_retained_and_summed() {
        let catalog = catalog();
        let table = demand_table(&[
            ("Ghost", "Jan", 4.0),
            ("Ghost", "Jan", 6.0),
            ("P1", "Mars", 2.0),
            ("P1", "Jan", 1.0),
        ]);

        let matrix = DemandMatrix::normalize(&table, &catalog);

        assert_eq!(
            matrix.off_catalog(),
            [
                DemandCell {
                    product: "Ghost".to_string(),
                    period: "Jan".to_string(),
                    quantity: 10.0,
                },
                DemandCell {
                    product: "P1".to_string(),
                    period: "Mars".to_string(),
                    quantity: 2.0,
                },
            ]
        );

        let p1 = catalog.product_idx("P1").unwrap();
        let jan = catalog.period_idx("Jan").unwrap();
        assert_eq!(matrix.quantity(p1, jan), 1.0);
    }
}
