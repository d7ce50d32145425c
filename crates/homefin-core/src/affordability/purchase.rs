//! Purchase price planning.
//!
//! Two directions: start from a fixed purchase price and find how long the
//! affordable payment takes to repay the credit, or start from a fixed loan
//! term and find the highest purchase price the payment supports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortisation::schedule::{loan_term, present_value, LoanTerm};
use crate::error::HomefinError;
use crate::time_value::MONTHS_PER_YEAR;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Timing, Years};
use crate::HomefinResult;

/// Purchase side costs, each as a rate of the purchase price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AncillaryCosts {
    #[serde(default)]
    pub broker_rate: Rate,
    #[serde(default)]
    pub notary_rate: Rate,
    #[serde(default)]
    pub transfer_tax_rate: Rate,
}

impl AncillaryCosts {
    pub fn total_rate(&self) -> Rate {
        self.broker_rate + self.notary_rate + self.transfer_tax_rate
    }

    fn validate(&self) -> HomefinResult<()> {
        for (field, rate) in [
            ("broker_rate", self.broker_rate),
            ("notary_rate", self.notary_rate),
            ("transfer_tax_rate", self.transfer_tax_rate),
        ] {
            if rate < Decimal::ZERO {
                return Err(HomefinError::InvalidInput {
                    field: field.into(),
                    reason: "Ancillary cost rate cannot be negative".into(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixed purchase price
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPricePlanInput {
    pub purchase_price: Money,
    pub equity: Money,
    #[serde(default)]
    pub ancillary: AncillaryCosts,
    /// Credit rate, annual nominal
    pub annual_rate: Rate,
    /// Affordable monthly payment (an outflow, negative)
    pub monthly_payment: Money,
    #[serde(default)]
    pub timing: Timing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPricePlanOutput {
    pub ancillary_rate: Rate,
    pub ancillary_costs: Money,
    pub total_purchase_cost: Money,
    /// Equity / total purchase cost
    pub equity_ratio: Rate,
    pub credit_required: Money,
    pub loan_term: LoanTerm,
}

/// Credit needed for a fixed purchase price, and how long it takes to repay.
pub fn fixed_price_plan(
    input: &FixedPricePlanInput,
) -> HomefinResult<ComputationOutput<FixedPricePlanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.purchase_price <= Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }
    validate_equity(input.equity)?;
    input.ancillary.validate()?;

    let ancillary_rate = input.ancillary.total_rate();
    let ancillary_costs = input.purchase_price * ancillary_rate;
    let total_purchase_cost = input.purchase_price + ancillary_costs;
    let equity_ratio = input.equity / total_purchase_cost;

    let mut credit_required = total_purchase_cost - input.equity;
    if credit_required < Decimal::ZERO {
        warnings.push("Equity exceeds the total purchase cost; no credit is required".into());
        credit_required = Decimal::ZERO;
    }

    let loan_term = loan_term(
        input.annual_rate,
        input.monthly_payment,
        credit_required,
        Decimal::ZERO,
        input.timing,
    )?;
    if let LoanTerm::Unsolvable(unsolvable) = &loan_term {
        warnings.push(unsolvable.message.clone());
    }

    let output = FixedPricePlanOutput {
        ancillary_rate,
        ancillary_costs,
        total_purchase_cost,
        equity_ratio,
        credit_required,
        loan_term,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Purchase price plus ancillary costs less equity, repaid at the affordable payment",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Fixed loan term
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedTermPlanInput {
    pub term_years: Years,
    pub equity: Money,
    #[serde(default)]
    pub ancillary: AncillaryCosts,
    /// Credit rate, annual nominal
    pub annual_rate: Rate,
    /// Affordable monthly payment (an outflow, negative)
    pub monthly_payment: Money,
    #[serde(default)]
    pub timing: Timing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedTermPlanOutput {
    pub period_count: Decimal,
    pub max_credit: Money,
    pub total_purchase_cost: Money,
    /// Equity / total purchase cost
    pub equity_ratio: Rate,
    /// Highest purchase price once ancillary costs are paid
    pub purchase_price: Money,
    pub ancillary_costs: Money,
}

/// Highest purchase price the affordable payment supports over a fixed term.
pub fn fixed_term_plan(
    input: &FixedTermPlanInput,
) -> HomefinResult<ComputationOutput<FixedTermPlanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.term_years < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "term_years".into(),
            reason: "Loan term cannot be negative".into(),
        });
    }
    validate_equity(input.equity)?;
    input.ancillary.validate()?;

    let period_count = input.term_years * MONTHS_PER_YEAR;
    let mut max_credit = present_value(
        input.annual_rate,
        period_count,
        input.monthly_payment,
        Decimal::ZERO,
        input.timing,
    )?;
    if max_credit < Decimal::ZERO {
        warnings.push("Monthly payment is not an outflow; no credit can be serviced".into());
        max_credit = Decimal::ZERO;
    }

    let total_purchase_cost = max_credit + input.equity;
    if total_purchase_cost.is_zero() {
        return Err(HomefinError::DivisionByZero {
            context: "equity ratio of a zero purchase budget".into(),
        });
    }
    let equity_ratio = input.equity / total_purchase_cost;

    let ancillary_rate = input.ancillary.total_rate();
    let purchase_price = total_purchase_cost / (Decimal::ONE + ancillary_rate);
    let ancillary_costs = purchase_price * ancillary_rate;

    let output = FixedTermPlanOutput {
        period_count,
        max_credit,
        total_purchase_cost,
        equity_ratio,
        purchase_price,
        ancillary_costs,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity present value of the affordable payment plus equity, net of ancillary costs",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_equity(equity: Money) -> HomefinResult<()> {
    if equity < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "equity".into(),
            reason: "Equity cannot be negative".into(),
        });
    }
    Ok(())
}
