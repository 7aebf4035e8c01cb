mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::listings::ListingEditArgs;
use commands::mortgage::{LoanArgs, PurchaseArgs, RatesArgs};

/// Mortgage payments, amortization schedules and listing edits
#[derive(Parser)]
#[command(
    name = "homefin",
    version,
    about = "Mortgage payments, amortization schedules and listing edits",
    long_about = "A CLI for home-buyer finance with decimal precision. Computes fixed-rate \
                  mortgage payments, year-by-year amortization schedules, purchase financing \
                  from price and down payment, today's rate board, and applies author edits \
                  to property posts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter when RUST_LOG is unset (e.g. debug, home_finance_core=trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment for a fixed-rate loan
    Payment(LoanArgs),
    /// Year-by-year amortization schedule
    Schedule(LoanArgs),
    /// Financing summary for a home purchase
    Purchase(PurchaseArgs),
    /// Today's mortgage rates, optionally priced for a loan amount
    Rates(RatesArgs),
    /// Apply author edits to a property post
    ListingEdit(ListingEditArgs),
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

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(2);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Schedule(args) => commands::mortgage::run_schedule(args),
        Commands::Purchase(args) => commands::mortgage::run_purchase(args),
        Commands::Rates(args) => commands::mortgage::run_rates(args),
        Commands::ListingEdit(args) => commands::listings::run_listing_edit(args),
        Commands::Version => {
            println!("homefin {}", env!("CARGO_PKG_VERSION"));
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
