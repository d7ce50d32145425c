use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use homefin_core::amortisation::batch::{self, ScenarioComparisonInput};
use homefin_core::amortisation::schedule::{
    self, AmortisationInput, PresentValueInput, Scenario, ScheduleOptions,
};
use homefin_core::Timing;

use super::{RoundingArg, TimingArg};
use crate::input;

/// Arguments for a single amortisation schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Annual nominal credit rate (e.g. 0.04 for 4%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Monthly payment, negative for an outflow (e.g. -2000)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Opening loan balance
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Balance left outstanding after the final payment
    #[arg(long, default_value = "0")]
    pub residual_value: Decimal,

    #[arg(long, value_enum, default_value = "end")]
    pub timing: TimingArg,

    #[arg(long, value_enum, default_value = "floor")]
    pub rounding: RoundingArg,

    /// Longest payoff accepted, in months
    #[arg(long, default_value = "1200")]
    pub max_periods: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for comparing several credit rates
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScenariosArgs {
    /// Comma-separated annual rates (e.g. "0.02,0.03,0.04,0.045")
    #[arg(long, value_delimiter = ',')]
    pub rates: Option<Vec<Decimal>>,

    /// Monthly payment, negative for an outflow
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Opening loan balance
    #[arg(long)]
    pub principal: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub residual_value: Decimal,

    #[arg(long, value_enum, default_value = "end")]
    pub timing: TimingArg,

    #[arg(long, value_enum, default_value = "floor")]
    pub rounding: RoundingArg,

    #[arg(long, default_value = "1200")]
    pub max_periods: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the payoff period of a loan
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanTermArgs {
    #[arg(long)]
    pub rate: Decimal,

    /// Monthly payment, negative for an outflow
    #[arg(long)]
    pub payment: Decimal,

    #[arg(long)]
    pub principal: Decimal,

    #[arg(long, default_value = "0")]
    pub residual_value: Decimal,

    #[arg(long, value_enum, default_value = "end")]
    pub timing: TimingArg,
}

/// Arguments for the largest serviceable principal
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PresentValueArgs {
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of monthly payments (may be fractional)
    #[arg(long)]
    pub periods: Option<Decimal>,

    /// Monthly payment, negative for an outflow
    #[arg(long)]
    pub payment: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub residual_value: Decimal,

    #[arg(long, value_enum, default_value = "end")]
    pub timing: TimingArg,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortisationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let scenario = Scenario::new(
            args.rate.ok_or("--rate is required (or provide --input)")?,
            args.payment.ok_or("--payment is required (or provide --input)")?,
            args.principal.ok_or("--principal is required (or provide --input)")?,
        )
        .with_residual_value(args.residual_value)
        .with_timing(args.timing.into());
        AmortisationInput {
            scenario,
            options: ScheduleOptions {
                rounding: args.rounding.into(),
                max_periods: args.max_periods,
            },
        }
    };

    let result = schedule::amortise(&amort_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: ScenarioComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScenarioComparisonInput {
            annual_rates: args.rates.ok_or("--rates is required (or provide --input)")?,
            payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            residual_value: args.residual_value,
            timing: args.timing.into(),
            options: ScheduleOptions {
                rounding: args.rounding.into(),
                max_periods: args.max_periods,
            },
        }
    };

    let result = batch::compare_scenarios(&comparison_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan_term(args: LoanTermArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let timing: Timing = args.timing.into();
    let term = schedule::loan_term(
        args.rate,
        args.payment,
        args.principal,
        args.residual_value,
        timing,
    )?;
    Ok(serde_json::to_value(term)?)
}

pub fn run_present_value(args: PresentValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pv_input: PresentValueInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PresentValueInput {
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            period_count: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
            payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
            residual_value: args.residual_value,
            timing: args.timing.into(),
        }
    };

    let result = schedule::max_principal(&pv_input)?;
    Ok(serde_json::to_value(result)?)
}
