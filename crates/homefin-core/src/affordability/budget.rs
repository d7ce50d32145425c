//! Household side of a purchase: what the remaining savings grow to, and
//! how much of the monthly budget can go to the loan.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HomefinError;
use crate::time_value::{self, monthly_rate, MONTHS_PER_YEAR};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Timing, Years};
use crate::HomefinResult;

// ---------------------------------------------------------------------------
// Asset projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetProjectionInput {
    pub total_assets: Money,
    /// Part of the assets contributed as equity to the purchase
    pub equity: Money,
    /// Annual return on the remaining assets, compounded monthly
    pub annual_rate: Rate,
    pub years: Years,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetProjectionOutput {
    pub remaining_assets: Money,
    pub future_value: Money,
    pub gain: Money,
}

/// Grow the assets left after the equity contribution.
pub fn project_assets(
    input: &AssetProjectionInput,
) -> HomefinResult<ComputationOutput<AssetProjectionOutput>> {
    let start = Instant::now();

    if input.total_assets < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "total_assets".into(),
            reason: "Total assets cannot be negative".into(),
        });
    }
    if input.equity < Decimal::ZERO || input.equity > input.total_assets {
        return Err(HomefinError::InvalidInput {
            field: "equity".into(),
            reason: "Equity must be between 0 and total assets".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Rate of return cannot be negative".into(),
        });
    }
    if input.years < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "years".into(),
            reason: "Time frame cannot be negative".into(),
        });
    }

    let remaining_assets = input.total_assets - input.equity;
    // Depositing the remainder is an outflow; the future value comes back in
    let future_value = time_value::fv(
        monthly_rate(input.annual_rate),
        input.years * MONTHS_PER_YEAR,
        Decimal::ZERO,
        -remaining_assets,
        Timing::End,
    )?;

    let output = AssetProjectionOutput {
        remaining_assets,
        future_value,
        gain: future_value - remaining_assets,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly compounding of remaining assets",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Monthly budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyBudgetInput {
    /// Current rent including utilities, freed up by the purchase
    pub rent: Money,
    /// Amount currently saved each month
    pub monthly_savings: Money,
    /// Running costs of the property per m² and month
    pub running_cost_per_sqm: Money,
    pub living_area_sqm: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyBudgetOutput {
    /// Rent plus savings
    pub liquid_funds: Money,
    /// Running costs and reserves of the property (an outflow)
    pub operating_reserves: Money,
    /// Monthly loan payment the budget supports (an outflow, negative)
    pub affordable_payment: Money,
}

/// Monthly loan payment left after the property's running costs.
pub fn affordable_payment(
    input: &MonthlyBudgetInput,
) -> HomefinResult<ComputationOutput<MonthlyBudgetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for (field, value) in [
        ("rent", input.rent),
        ("monthly_savings", input.monthly_savings),
        ("running_cost_per_sqm", input.running_cost_per_sqm),
        ("living_area_sqm", input.living_area_sqm),
    ] {
        if value < Decimal::ZERO {
            return Err(HomefinError::InvalidInput {
                field: field.into(),
                reason: "Value cannot be negative".into(),
            });
        }
    }

    let liquid_funds = input.rent + input.monthly_savings;
    let operating_reserves = -input.running_cost_per_sqm * input.living_area_sqm;
    let affordable_payment = -(liquid_funds + operating_reserves);

    if affordable_payment >= Decimal::ZERO {
        warnings.push(
            "Running costs absorb all liquid funds; no loan payment is affordable".into(),
        );
    }

    let output = MonthlyBudgetOutput {
        liquid_funds,
        operating_reserves,
        affordable_payment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rent and savings less property running costs",
        input,
        warnings,
        elapsed,
        output,
    ))
}
