use std::path::PathBuf;

use anyhow::Error;
use clap::Args;
use comfy_table::Table;
use tracing::info;
use vulcan_allocator::engine::{AllocationEngine, AllocationOutcome, EngineParams};
use vulcan_allocator::solver::good_lp_backend::GoodLpBackend;

use crate::csv_baseline::{self, CsvBaseline};

#[derive(Args)]
pub struct AllocateArgs {
    /// Directory containing rates.csv, calendar.csv and demand.csv
    #[arg(short, long, default_value = "data")]
    baseline: PathBuf,

    /// Wide demand CSV replacing the baseline demand
    #[arg(short, long)]
    demand: Option<PathBuf>,

    /// Emit the outcome as JSON instead of rendered tables
    #[arg(long)]
    json: bool,

    /// Solve periods one after another instead of in parallel
    #[arg(long)]
    sequential: bool,
}

pub fn run(args: AllocateArgs) -> Result<(), Error> {
    let baseline = CsvBaseline::new(&args.baseline);
    let demand = args
        .demand
        .as_deref()
        .map(csv_baseline::read_wide_demand)
        .transpose()?;

    let engine = AllocationEngine::with_backend(
        GoodLpBackend,
        EngineParams {
            parallel: !args.sequential,
            ..EngineParams::default()
        },
    );
    let outcome = engine.run(&baseline, demand.as_ref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_tables(&outcome);
    info!(
        allocations = outcome.allocations.len(),
        total_allocated = outcome
            .allocations
            .iter()
            .map(|row| row.quantity)
            .sum::<f64>(),
        "allocation finished"
    );
    Ok(())
}

fn print_tables(outcome: &AllocationOutcome) {
    let mut allocations = Table::new();
    allocations.set_header(["Period", "Product", "Line", "Quantity"]);
    for row in &outcome.allocations {
        allocations.add_row([
            row.period.clone(),
            row.product.clone(),
            row.line.clone(),
            format!("{:.3}", row.quantity),
        ]);
    }
    println!("Allocations\n{allocations}");

    let mut utilization = Table::new();
    utilization.set_header(["Period", "Line", "Produced", "Capacity", "Utilization"]);
    for row in &outcome.line_utilization {
        utilization.add_row([
            row.period.clone(),
            row.line.clone(),
            format!("{:.3}", row.produced),
            format!("{:.3}", row.capacity),
            format!("{:.1}%", row.utilization * 100.0),
        ]);
    }
    println!("Line utilization\n{utilization}");

    let mut fill_rates = Table::new();
    fill_rates.set_header(["Period", "Product", "Produced", "Demand", "Fill rate"]);
    for row in &outcome.fill_rates {
        fill_rates.add_row([
            row.period.clone(),
            row.product.clone(),
            format!("{:.3}", row.produced),
            format!("{:.3}", row.demand),
            row.fill_rate
                .map(|ratio| format!("{:.1}%", ratio * 100.0))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("Fill rates\n{fill_rates}");
}
