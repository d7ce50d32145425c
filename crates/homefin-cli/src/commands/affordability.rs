use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use homefin_core::affordability::budget::{self, AssetProjectionInput, MonthlyBudgetInput};
use homefin_core::affordability::purchase::{
    self, AncillaryCosts, FixedPricePlanInput, FixedTermPlanInput,
};

use super::TimingArg;
use crate::input;

/// Arguments for projecting the assets left after the equity contribution
#[derive(Args)]
pub struct AssetsArgs {
    #[arg(long)]
    pub total_assets: Option<Decimal>,

    /// Part of the assets put into the purchase
    #[arg(long)]
    pub equity: Option<Decimal>,

    /// Annual return on the remaining assets
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Projection horizon in years
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the monthly payment the household budget supports
#[derive(Args)]
pub struct AffordablePaymentArgs {
    /// Current monthly rent including utilities
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Amount currently saved each month
    #[arg(long)]
    pub savings: Option<Decimal>,

    /// Running costs per m² and month
    #[arg(long, default_value = "4")]
    pub running_cost: Decimal,

    /// Living area in m²
    #[arg(long)]
    pub area: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Ancillary cost rates shared by both purchase plans
#[derive(Args)]
pub struct AncillaryArgs {
    /// Broker commission as a rate of the price
    #[arg(long, default_value = "0")]
    pub broker: Decimal,

    /// Notary and land registry fees as a rate of the price
    #[arg(long, default_value = "0")]
    pub notary: Decimal,

    /// Land transfer tax as a rate of the price
    #[arg(long, default_value = "0")]
    pub transfer_tax: Decimal,
}

impl From<&AncillaryArgs> for AncillaryCosts {
    fn from(args: &AncillaryArgs) -> Self {
        AncillaryCosts {
            broker_rate: args.broker,
            notary_rate: args.notary,
            transfer_tax_rate: args.transfer_tax,
        }
    }
}

/// Arguments for planning a purchase at a fixed price
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FixedPriceArgs {
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub equity: Decimal,

    #[command(flatten)]
    pub ancillary: AncillaryArgs,

    /// Annual nominal credit rate
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Affordable monthly payment, negative for an outflow
    #[arg(long)]
    pub payment: Option<Decimal>,

    #[arg(long, value_enum, default_value = "end")]
    pub timing: TimingArg,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for planning a purchase over a fixed loan term
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FixedTermArgs {
    /// Loan term in years
    #[arg(long)]
    pub years: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub equity: Decimal,

    #[command(flatten)]
    pub ancillary: AncillaryArgs,

    /// Annual nominal credit rate
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Affordable monthly payment, negative for an outflow
    #[arg(long)]
    pub payment: Option<Decimal>,

    #[arg(long, value_enum, default_value = "end")]
    pub timing: TimingArg,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_assets(args: AssetsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assets_input: AssetProjectionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        AssetProjectionInput {
            total_assets: args
                .total_assets
                .ok_or("--total-assets is required (or provide --input)")?,
            equity: args.equity.ok_or("--equity is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
        }
    };

    let result = budget::project_assets(&assets_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_affordable_payment(
    args: AffordablePaymentArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let budget_input: MonthlyBudgetInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        MonthlyBudgetInput {
            rent: args.rent.ok_or("--rent is required (or provide --input)")?,
            monthly_savings: args
                .savings
                .ok_or("--savings is required (or provide --input)")?,
            running_cost_per_sqm: args.running_cost,
            living_area_sqm: args.area.ok_or("--area is required (or provide --input)")?,
        }
    };

    let result = budget::affordable_payment(&budget_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_fixed_price(args: FixedPriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan_input: FixedPricePlanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        FixedPricePlanInput {
            purchase_price: args.price.ok_or("--price is required (or provide --input)")?,
            equity: args.equity,
            ancillary: AncillaryCosts::from(&args.ancillary),
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            monthly_payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
            timing: args.timing.into(),
        }
    };

    let result = purchase::fixed_price_plan(&plan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_fixed_term(args: FixedTermArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan_input: FixedTermPlanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        FixedTermPlanInput {
            term_years: args.years.ok_or("--years is required (or provide --input)")?,
            equity: args.equity,
            ancillary: AncillaryCosts::from(&args.ancillary),
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            monthly_payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
            timing: args.timing.into(),
        }
    };

    let result = purchase::fixed_term_plan(&plan_input)?;
    Ok(serde_json::to_value(result)?)
}
