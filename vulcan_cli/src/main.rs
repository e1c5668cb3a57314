use clap::{Parser, Subcommand};

mod allocate;
mod catalog;
mod csv_baseline;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a capacity allocation over CSV baseline tables
    Allocate {
        #[command(flatten)]
        args: allocate::AllocateArgs,
    },
    /// Print the resolved product/line/period catalog and default demand
    Catalog {
        #[command(flatten)]
        args: catalog::CatalogArgs,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Allocate { args } => allocate::run(args),
        Commands::Catalog { args } => catalog::run(args),
    }
}
