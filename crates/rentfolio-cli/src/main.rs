mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::metrics::{IrrArgs, MetricsArgs};
use commands::mortgage::MortgageArgs;
use commands::opex::{OpexArgs, TaxEstimateArgs};
use commands::projections::{IncomeSafetyArgs, RentProjectionArgs, WealthBuildArgs};
use commands::rent_roll::RentRollArgs;

/// Rental property operating expenses and investment metrics
#[derive(Parser)]
#[command(
    name = "rentfolio",
    version,
    about = "Rental property operating expenses and investment metrics",
    long_about = "A CLI for rental property calculations with decimal precision. \
                  Computes monthly OPEX with mortgage escrow handling, NOI, cap rate, \
                  DCR, ROI, cash-on-cash, a 10-year IRR approximation, loan \
                  amortisation, rent and equity projections, and the rent roll."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly operating expenses by line
    Opex(OpexArgs),
    /// NOI, cap rate, DCR, ROI, cash-on-cash and IRR for a property
    Metrics(MetricsArgs),
    /// 10-year IRR approximation
    Irr(IrrArgs),
    /// Loan payment, yearly balances and debt service
    Mortgage(MortgageArgs),
    /// Ten-year monthly rent projection
    RentProjection(RentProjectionArgs),
    /// Ten-year income vs. expense safety margin
    IncomeSafety(IncomeSafetyArgs),
    /// Property value, loan balance and equity over ten years
    WealthBuild(WealthBuildArgs),
    /// Rent roll, collections and monthly cash position
    RentRoll(RentRollArgs),
    /// Estimate annual property tax from the sale price
    TaxEstimate(TaxEstimateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Opex(args) => commands::opex::run_opex(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Irr(args) => commands::metrics::run_irr(args),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::RentProjection(args) => commands::projections::run_rent_projection(args),
        Commands::IncomeSafety(args) => commands::projections::run_income_safety(args),
        Commands::WealthBuild(args) => commands::projections::run_wealth_build(args),
        Commands::RentRoll(args) => commands::rent_roll::run_rent_roll(args),
        Commands::TaxEstimate(args) => commands::opex::run_tax_estimate(args),
        Commands::Version => {
            println!("rentfolio {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
