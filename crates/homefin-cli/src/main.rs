mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::affordability::{
    AffordablePaymentArgs, AssetsArgs, FixedPriceArgs, FixedTermArgs,
};
use commands::amortisation::{LoanTermArgs, PresentValueArgs, ScenariosArgs, ScheduleArgs};

/// Home financing calculations
#[derive(Parser)]
#[command(
    name = "homefin",
    version,
    about = "Home financing calculations",
    long_about = "A CLI for planning a property purchase with decimal precision. \
                  Supports amortisation schedules, credit rate comparisons, loan terms, \
                  affordable payments and purchase price planning."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the amortisation schedule of a loan
    Schedule(ScheduleArgs),
    /// Amortise the same loan at several credit rates
    Scenarios(ScenariosArgs),
    /// Number of months and years until a loan is repaid
    LoanTerm(LoanTermArgs),
    /// Largest principal a monthly payment services
    PresentValue(PresentValueArgs),
    /// Project the assets left after the equity contribution
    Assets(AssetsArgs),
    /// Monthly payment the household budget supports
    AffordablePayment(AffordablePaymentArgs),
    /// Credit and loan term for a fixed purchase price
    FixedPrice(FixedPriceArgs),
    /// Highest purchase price for a fixed loan term
    FixedTerm(FixedTermArgs),
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
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::amortisation::run_schedule(args),
        Commands::Scenarios(args) => commands::amortisation::run_scenarios(args),
        Commands::LoanTerm(args) => commands::amortisation::run_loan_term(args),
        Commands::PresentValue(args) => commands::amortisation::run_present_value(args),
        Commands::Assets(args) => commands::affordability::run_assets(args),
        Commands::AffordablePayment(args) => commands::affordability::run_affordable_payment(args),
        Commands::FixedPrice(args) => commands::affordability::run_fixed_price(args),
        Commands::FixedTerm(args) => commands::affordability::run_fixed_term(args),
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
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
