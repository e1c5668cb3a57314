use std::path::PathBuf;

use anyhow::Error;
use clap::Args;
use comfy_table::Table;
use serde_json::json;
use vulcan_allocator::baseline::BaselineProvider;
use vulcan_allocator::problem::allocation_problem::AllocationProblem;

use crate::csv_baseline::CsvBaseline;

#[derive(Args)]
pub struct CatalogArgs {
    /// Directory containing rates.csv, calendar.csv and demand.csv
    #[arg(short, long, default_value = "data")]
    baseline: PathBuf,

    /// Emit the catalog and default demand as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CatalogArgs) -> Result<(), Error> {
    let provider = CsvBaseline::new(&args.baseline);
    let rates = provider.capacity_rates()?;
    let calendar = provider.calendar()?;
    let demand = provider.default_demand()?;

    // building the problem also fail-fasts on shape errors
    let problem = AllocationProblem::build(&rates, &calendar, &demand)?;
    let summary = problem.catalog().summary();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "catalog": summary,
                "default_demand": demand,
            }))?
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["Products", "Lines", "Periods"]);
    table.add_row([
        summary.products.join("\n"),
        summary.lines.join("\n"),
        summary.periods.join("\n"),
    ]);
    println!("Catalog\n{table}");

    let mut demand_out = Table::new();
    demand_out.set_header(["Product", "Period", "Quantity"]);
    for row in &demand.rows {
        demand_out.add_row([
            row.product.clone(),
            row.period.clone(),
            format!("{:.3}", row.quantity),
        ]);
    }
    println!("Default demand\n{demand_out}");

    Ok(())
}
