//! Period-by-period amortisation schedules for a fixed monthly payment.
//!
//! The payoff period is solved in closed form, then each period's
//! interest/principal split and residual debt are evaluated directly from the
//! annuity relations. Residual debt after period `k` is always `-FV(k)`, so no
//! rounding error accumulates across long schedules.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::HomefinError;
use crate::time_value::{self, monthly_rate, PeriodCount, MONTHS_PER_YEAR};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Timing, Years};
use crate::HomefinResult;

/// 100 years of monthly payments
const DEFAULT_MAX_PERIODS: u32 = 1200;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One loan hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Annual nominal rate (0.04 = 4% p.a.), converted to monthly by / 12
    pub annual_rate: Rate,
    /// Monthly payment; negative = paid by the borrower
    pub payment: Money,
    /// Opening loan balance
    pub principal: Money,
    /// Balance to be left outstanding after the final payment
    #[serde(default)]
    pub residual_value: Money,
    #[serde(default)]
    pub timing: Timing,
}

impl Scenario {
    /// Fully amortising scenario with end-of-period payments.
    pub fn new(annual_rate: Rate, payment: Money, principal: Money) -> Self {
        Self {
            annual_rate,
            payment,
            principal,
            residual_value: Decimal::ZERO,
            timing: Timing::End,
        }
    }

    pub fn with_residual_value(mut self, residual_value: Money) -> Self {
        self.residual_value = residual_value;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}

/// How the fractional remainder of the period count becomes whole periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodRounding {
    /// Whole periods only; the final partial period is dropped.
    #[default]
    Floor,
    /// One extra full payment; the last period overshoots the residual value.
    Ceil,
    /// One extra reduced payment that lands exactly on the residual value.
    Settle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub rounding: PeriodRounding,
    /// Longest payoff accepted before the scenario is reported unsolvable
    #[serde(default = "default_max_periods")]
    pub max_periods: u32,
}

fn default_max_periods() -> u32 {
    DEFAULT_MAX_PERIODS
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            rounding: PeriodRounding::default(),
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

/// Input for [`amortise`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortisationInput {
    pub scenario: Scenario,
    #[serde(default)]
    pub options: ScheduleOptions,
}

/// Input for [`max_principal`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentValueInput {
    pub annual_rate: Rate,
    /// Number of monthly payments (may be fractional)
    pub period_count: Decimal,
    pub payment: Money,
    #[serde(default)]
    pub residual_value: Money,
    #[serde(default)]
    pub timing: Timing,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One row of the amortisation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub period: u32,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub residual_debt: Money,
    pub cumulative_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub periods: Vec<Period>,
    /// Exact (fractional) payoff period from the closed form
    pub period_count: Decimal,
    /// Length of the table in years
    pub term_years: Years,
    pub total_interest: Money,
    pub total_paid: Money,
    pub final_residual_debt: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnsolvableReason {
    /// No payment at all: the balance never moves toward the target.
    ZeroPayment,
    /// The payment does not exceed the interest accruing each month.
    PaymentBelowInterest,
    /// The balance would have to run backwards in time to reach the target.
    NegativePeriodCount,
    /// A payoff exists but takes longer than the configured limit.
    ExceedsMaxTerm { period_count: Decimal, max_periods: u32 },
}

impl fmt::Display for UnsolvableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsolvableReason::ZeroPayment => write!(
                f,
                "No repayment is made. Set a monthly payment (entered as an outflow)."
            ),
            UnsolvableReason::PaymentBelowInterest => write!(
                f,
                "The monthly payment does not cover the monthly interest. \
                 Increase the monthly payment or reduce the principal or credit rate."
            ),
            UnsolvableReason::NegativePeriodCount => write!(
                f,
                "The payment moves the balance away from the residual value. \
                 Make sure the monthly repayment is an outflow and the residual value \
                 is below the principal."
            ),
            UnsolvableReason::ExceedsMaxTerm {
                period_count,
                max_periods,
            } => write!(
                f,
                "Payoff would take {} periods, more than the limit of {max_periods}. \
                 Increase the monthly payment or reduce the principal or credit rate.",
                period_count.ceil()
            ),
        }
    }
}

/// A scenario for which no finite amortisation period exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unsolvable {
    pub annual_rate: Rate,
    #[serde(flatten)]
    pub reason: UnsolvableReason,
    /// Remediation text suitable for direct display
    pub message: String,
}

impl Unsolvable {
    fn new(annual_rate: Rate, reason: UnsolvableReason) -> Self {
        let message = reason.to_string();
        Self {
            annual_rate,
            reason,
            message,
        }
    }
}

/// Result of [`build_schedule`]: either a full table or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    Solved(Schedule),
    Unsolvable(Unsolvable),
}

impl ScheduleOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, ScheduleOutcome::Solved(_))
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            ScheduleOutcome::Solved(s) => Some(s),
            ScheduleOutcome::Unsolvable(_) => None,
        }
    }

    pub fn unsolvable(&self) -> Option<&Unsolvable> {
        match self {
            ScheduleOutcome::Solved(_) => None,
            ScheduleOutcome::Unsolvable(u) => Some(u),
        }
    }
}

/// Payoff period of a scenario, or why there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoanTerm {
    Solved { period_count: Decimal, years: Years },
    Unsolvable(Unsolvable),
}

impl LoanTerm {
    pub fn years(&self) -> Option<Years> {
        match self {
            LoanTerm::Solved { years, .. } => Some(*years),
            LoanTerm::Unsolvable(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve the number of monthly periods needed to take `principal` down to
/// `residual_value`.
///
/// `rate` is the annual nominal rate. A non-finite or negative count means the
/// scenario has no payoff; callers must check before using it.
pub fn compute_period_count(
    rate: Rate,
    payment: Money,
    principal: Money,
    residual_value: Money,
    timing: Timing,
) -> HomefinResult<PeriodCount> {
    validate_loan(rate, principal, residual_value)?;
    time_value::nper(monthly_rate(rate), payment, principal, -residual_value, timing)
}

/// Payoff period of a scenario in months and years.
pub fn loan_term(
    rate: Rate,
    payment: Money,
    principal: Money,
    residual_value: Money,
    timing: Timing,
) -> HomefinResult<LoanTerm> {
    let count = compute_period_count(rate, payment, principal, residual_value, timing)?;
    Ok(match classify(rate, payment, count, None) {
        Ok(n) => LoanTerm::Solved {
            period_count: n,
            years: n / MONTHS_PER_YEAR,
        },
        Err(unsolvable) => LoanTerm::Unsolvable(unsolvable),
    })
}

/// Build the amortisation table for one scenario.
pub fn build_schedule(
    scenario: &Scenario,
    options: &ScheduleOptions,
) -> HomefinResult<ScheduleOutcome> {
    if options.max_periods == 0 {
        return Err(HomefinError::InvalidInput {
            field: "max_periods".into(),
            reason: "Maximum number of periods must be at least 1".into(),
        });
    }

    let count = compute_period_count(
        scenario.annual_rate,
        scenario.payment,
        scenario.principal,
        scenario.residual_value,
        scenario.timing,
    )?;

    let exact = match classify(
        scenario.annual_rate,
        scenario.payment,
        count,
        Some((options.max_periods, options.rounding)),
    ) {
        Ok(n) => n,
        Err(unsolvable) => {
            log::debug!(
                "amortisation: scenario at {} p.a. unsolvable ({:?})",
                scenario.annual_rate,
                unsolvable.reason
            );
            return Ok(ScheduleOutcome::Unsolvable(unsolvable));
        }
    };

    let has_partial = !exact.fract().is_zero();
    let length = table_length(exact, options.rounding);
    let length = length.to_u32().ok_or_else(|| HomefinError::Overflow {
        context: format!("schedule length {length}"),
    })?;

    let rate = monthly_rate(scenario.annual_rate);
    let mut periods = Vec::with_capacity(length as usize);
    let mut cumulative_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for k in 1..=length {
        let settles = options.rounding == PeriodRounding::Settle && has_partial && k == length;
        let (interest_portion, principal_portion, residual_debt) = if settles {
            settle_final_period(scenario, rate, k)?
        } else {
            let principal_portion = time_value::ppmt(
                rate,
                k,
                scenario.payment,
                scenario.principal,
                scenario.timing,
            )?;
            let residual = -time_value::fv(
                rate,
                Decimal::from(k),
                scenario.payment,
                scenario.principal,
                scenario.timing,
            )?;
            (scenario.payment - principal_portion, principal_portion, residual)
        };

        cumulative_interest += interest_portion;
        total_paid += interest_portion + principal_portion;
        periods.push(Period {
            period: k,
            interest_portion,
            principal_portion,
            residual_debt,
            cumulative_interest,
        });
    }

    let final_residual_debt = periods
        .last()
        .map(|p| p.residual_debt)
        .unwrap_or(scenario.principal);

    Ok(ScheduleOutcome::Solved(Schedule {
        term_years: Decimal::from(length) / MONTHS_PER_YEAR,
        periods,
        period_count: exact,
        total_interest: cumulative_interest,
        total_paid,
        final_residual_debt,
    }))
}

/// Largest principal a fixed monthly payment services over `period_count`
/// months, leaving `residual_value` outstanding.
pub fn present_value(
    rate: Rate,
    period_count: Decimal,
    payment: Money,
    residual_value: Money,
    timing: Timing,
) -> HomefinResult<Money> {
    if rate < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if period_count < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "period_count".into(),
            reason: "Number of periods cannot be negative".into(),
        });
    }
    time_value::pv(monthly_rate(rate), period_count, payment, -residual_value, timing)
}

/// Amortisation table wrapped in the standard computation envelope.
pub fn amortise(
    input: &AmortisationInput,
) -> HomefinResult<ComputationOutput<ScheduleOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let outcome = build_schedule(&input.scenario, &input.options)?;

    match &outcome {
        ScheduleOutcome::Solved(schedule) => {
            let excluded = schedule.period_count - Decimal::from(schedule.periods.len() as u64);
            match input.options.rounding {
                PeriodRounding::Floor if excluded > Decimal::ZERO => warnings.push(format!(
                    "Final partial period ({} of a period) is not shown; {} remains outstanding",
                    excluded.round_dp(4),
                    schedule.final_residual_debt.round_dp(2)
                )),
                PeriodRounding::Ceil if excluded < Decimal::ZERO => warnings.push(format!(
                    "Last payment overshoots the residual value by {}",
                    (input.scenario.residual_value - schedule.final_residual_debt).round_dp(2)
                )),
                _ => {}
            }
        }
        ScheduleOutcome::Unsolvable(unsolvable) => warnings.push(unsolvable.message.clone()),
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Closed-form annuity amortisation (monthly periods, annual nominal rate / 12)",
        input,
        warnings,
        elapsed,
        outcome,
    ))
}

/// Maximum serviceable principal wrapped in the standard computation envelope.
pub fn max_principal(input: &PresentValueInput) -> HomefinResult<ComputationOutput<Money>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let principal = present_value(
        input.annual_rate,
        input.period_count,
        input.payment,
        input.residual_value,
        input.timing,
    )?;

    if principal < Decimal::ZERO {
        warnings.push(
            "Negative present value: the payment is an inflow or smaller than the residual value requires"
                .into(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity present value (monthly periods, annual nominal rate / 12)",
        input,
        warnings,
        elapsed,
        principal,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_loan(rate: Rate, principal: Money, residual_value: Money) -> HomefinResult<()> {
    if rate < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if principal < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if residual_value < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "residual_value".into(),
            reason: "Residual value cannot be negative".into(),
        });
    }
    Ok(())
}

/// Number of table rows a rounding policy produces for an exact period count.
fn table_length(exact: Decimal, rounding: PeriodRounding) -> Decimal {
    match rounding {
        PeriodRounding::Floor => exact.floor(),
        PeriodRounding::Ceil | PeriodRounding::Settle => exact.ceil(),
    }
}

/// Accept a solved period count or explain why the scenario has no payoff.
///
/// With a term limit, the count is checked against the length of the table
/// the rounding policy would build.
fn classify(
    rate: Rate,
    payment: Money,
    count: PeriodCount,
    term_limit: Option<(u32, PeriodRounding)>,
) -> Result<Decimal, Unsolvable> {
    let reason = if let Some(n) = count.solvable() {
        match term_limit {
            Some((max, rounding)) if table_length(n, rounding) > Decimal::from(max) => {
                UnsolvableReason::ExceedsMaxTerm {
                    period_count: n,
                    max_periods: max,
                }
            }
            _ => return Ok(n),
        }
    } else if count.is_finite() {
        UnsolvableReason::NegativePeriodCount
    } else if payment.is_zero() {
        UnsolvableReason::ZeroPayment
    } else {
        UnsolvableReason::PaymentBelowInterest
    };
    Err(Unsolvable::new(rate, reason))
}

/// The final, partial period under [`PeriodRounding::Settle`]: the payment is
/// cut so the balance lands exactly on the residual value.
fn settle_final_period(
    scenario: &Scenario,
    rate: Rate,
    k: u32,
) -> HomefinResult<(Money, Money, Money)> {
    let opening = -time_value::fv(
        rate,
        Decimal::from(k - 1),
        scenario.payment,
        scenario.principal,
        scenario.timing,
    )?;
    let target = scenario.residual_value;

    let (payment, interest) = match scenario.timing {
        Timing::End => (target - opening * (Decimal::ONE + rate), -opening * rate),
        Timing::Begin => {
            let interest = if k == 1 {
                Decimal::ZERO
            } else {
                -opening * rate / (Decimal::ONE + rate)
            };
            (target / (Decimal::ONE + rate) - opening, interest)
        }
    };

    Ok((interest, payment - interest, target))
}
