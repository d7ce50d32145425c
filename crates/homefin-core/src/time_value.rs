//! Time-value-of-money primitives.
//!
//! Cash-flow sign convention throughout: money received is positive, money
//! paid out is negative. A loan of 500,000 serviced by monthly payments of
//! 2,000 is `pv = 500000`, `pmt = -2000`. Every function takes the rate *per
//! period* and a [`Timing`] for the payment within the period.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::HomefinError;
use crate::types::{Money, Rate, Timing};
use crate::HomefinResult;

/// Payment periods per year. Annual nominal rates are divided by this.
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Number of periods solved from the annuity equation.
///
/// Decimal has no NaN or infinity, so the two ways the closed form can fail
/// are carried as explicit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PeriodCount {
    /// A real solution. May be fractional, may be negative.
    Finite(Decimal),
    /// The equation divides by zero (e.g. a payment that exactly covers interest).
    Infinite,
    /// The equation takes the logarithm of a non-positive number.
    NotANumber,
}

impl PeriodCount {
    pub fn is_finite(&self) -> bool {
        matches!(self, PeriodCount::Finite(_))
    }

    /// The count if it is finite.
    pub fn finite(self) -> Option<Decimal> {
        match self {
            PeriodCount::Finite(n) => Some(n),
            _ => None,
        }
    }

    /// The count if it is finite and non-negative.
    pub fn solvable(self) -> Option<Decimal> {
        self.finite().filter(|n| *n >= Decimal::ZERO)
    }
}

/// Convert an annual nominal rate to the monthly periodic rate.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / MONTHS_PER_YEAR
}

fn check_rate(rate: Rate) -> HomefinResult<()> {
    if rate <= dec!(-1) {
        return Err(HomefinError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

/// (1 + r)^n for a whole number of periods.
pub fn compound(rate: Rate, n: u32) -> HomefinResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(n))
        .ok_or_else(|| HomefinError::Overflow {
            context: format!("compounding factor over {n} periods"),
        })
}

/// (1 + r)^n for any non-negative number of periods.
///
/// Whole periods go through [`compound`]; fractional ones through `powd`.
pub fn growth_factor(rate: Rate, periods: Decimal) -> HomefinResult<Decimal> {
    if periods < Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods cannot be negative".into(),
        });
    }
    if periods.fract().is_zero() {
        if let Some(n) = periods.to_u32() {
            return compound(rate, n);
        }
    }
    (Decimal::ONE + rate)
        .checked_powd(periods)
        .ok_or_else(|| HomefinError::Overflow {
            context: format!("growth factor over {periods} periods"),
        })
}

fn overflow(context: &str) -> HomefinError {
    HomefinError::Overflow {
        context: context.into(),
    }
}

/// `(1 + r·w) / r · (factor − 1)`, the annuity term shared by FV, PV and PMT.
fn annuity_factor(rate: Rate, factor: Decimal, timing: Timing) -> HomefinResult<Decimal> {
    (Decimal::ONE + rate * timing.weight())
        .checked_div(rate)
        .and_then(|v| v.checked_mul(factor - Decimal::ONE))
        .ok_or_else(|| overflow("annuity factor"))
}

/// Future Value
pub fn fv(
    rate: Rate,
    nper: Decimal,
    pmt: Money,
    present_value: Money,
    timing: Timing,
) -> HomefinResult<Money> {
    check_rate(rate)?;
    if rate.is_zero() {
        return pmt
            .checked_mul(nper)
            .and_then(|paid| present_value.checked_add(paid))
            .map(|v| -v)
            .ok_or_else(|| overflow("FV at zero rate"));
    }

    let factor = growth_factor(rate, nper)?;
    let annuity = annuity_factor(rate, factor, timing)?;

    present_value
        .checked_mul(factor)
        .zip(pmt.checked_mul(annuity))
        .and_then(|(grown, paid)| grown.checked_add(paid))
        .map(|v| -v)
        .ok_or_else(|| overflow("FV"))
}

/// Present Value
pub fn pv(
    rate: Rate,
    nper: Decimal,
    pmt: Money,
    future_value: Money,
    timing: Timing,
) -> HomefinResult<Money> {
    check_rate(rate)?;
    if rate.is_zero() {
        return pmt
            .checked_mul(nper)
            .and_then(|paid| future_value.checked_add(paid))
            .map(|v| -v)
            .ok_or_else(|| overflow("PV at zero rate"));
    }

    let factor = growth_factor(rate, nper)?;
    if factor.is_zero() {
        return Err(HomefinError::DivisionByZero {
            context: "PV factor".into(),
        });
    }

    let annuity = annuity_factor(rate, factor, timing)?;
    pmt.checked_mul(annuity)
        .and_then(|paid| future_value.checked_add(paid))
        .and_then(|total| total.checked_div(factor))
        .map(|v| -v)
        .ok_or_else(|| overflow("PV"))
}

/// Payment (PMT)
pub fn pmt(
    rate: Rate,
    nper: Decimal,
    present_value: Money,
    future_value: Money,
    timing: Timing,
) -> HomefinResult<Money> {
    check_rate(rate)?;
    if nper <= Decimal::ZERO {
        return Err(HomefinError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return present_value
            .checked_add(future_value)
            .and_then(|total| total.checked_div(nper))
            .map(|v| -v)
            .ok_or_else(|| overflow("PMT at zero rate"));
    }

    let factor = growth_factor(rate, nper)?;
    let annuity = annuity_factor(rate, factor, timing)?;

    if annuity.is_zero() {
        return Err(HomefinError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    present_value
        .checked_mul(factor)
        .and_then(|grown| grown.checked_add(future_value))
        .and_then(|total| total.checked_div(annuity))
        .map(|v| -v)
        .ok_or_else(|| overflow("PMT"))
}

/// Number of periods (NPER) for a level payment to take `present_value` to
/// `future_value`.
pub fn nper(
    rate: Rate,
    pmt: Money,
    present_value: Money,
    future_value: Money,
    timing: Timing,
) -> HomefinResult<PeriodCount> {
    check_rate(rate)?;

    if rate.is_zero() {
        let numerator = present_value
            .checked_add(future_value)
            .map(|v| -v)
            .ok_or_else(|| overflow("NPER at zero rate"))?;
        return match (pmt.is_zero(), numerator.is_zero()) {
            (true, true) => Ok(PeriodCount::NotANumber),
            (true, false) => Ok(PeriodCount::Infinite),
            (false, _) => numerator
                .checked_div(pmt)
                .map(PeriodCount::Finite)
                .ok_or_else(|| overflow("NPER at zero rate")),
        };
    }

    let z = pmt
        .checked_mul(Decimal::ONE + rate * timing.weight())
        .and_then(|v| v.checked_div(rate))
        .ok_or_else(|| overflow("NPER annuity term"))?;
    let numerator = z
        .checked_sub(future_value)
        .ok_or_else(|| overflow("NPER annuity term"))?;
    let denominator = present_value
        .checked_add(z)
        .ok_or_else(|| overflow("NPER annuity term"))?;

    if denominator.is_zero() {
        return Ok(if numerator.is_zero() {
            PeriodCount::NotANumber
        } else {
            PeriodCount::Infinite
        });
    }

    let ratio = numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow("NPER ratio"))?;
    if ratio.is_zero() {
        return Ok(PeriodCount::Infinite);
    }
    if ratio.is_sign_negative() {
        return Ok(PeriodCount::NotANumber);
    }

    let (Some(ln_ratio), Some(ln_growth)) =
        (ratio.checked_ln(), (Decimal::ONE + rate).checked_ln())
    else {
        return Ok(PeriodCount::NotANumber);
    };
    if ln_growth.is_zero() {
        return Ok(PeriodCount::Infinite);
    }

    ln_ratio
        .checked_div(ln_growth)
        .map(PeriodCount::Finite)
        .ok_or_else(|| overflow("NPER"))
}

/// Interest portion of payment number `per` (1-based).
///
/// Under [`Timing::Begin`] the first payment carries no interest and later
/// payments settle the interest accrued over the preceding period.
pub fn ipmt(
    rate: Rate,
    per: u32,
    pmt: Money,
    present_value: Money,
    timing: Timing,
) -> HomefinResult<Money> {
    if per == 0 {
        return Err(HomefinError::InvalidInput {
            field: "per".into(),
            reason: "Payment periods are numbered from 1".into(),
        });
    }
    if timing == Timing::Begin && per == 1 {
        return Ok(Decimal::ZERO);
    }

    let opening = fv(rate, Decimal::from(per - 1), pmt, present_value, timing)?;
    let interest = opening
        .checked_mul(rate)
        .ok_or_else(|| overflow("IPMT"))?;

    match timing {
        Timing::End => Ok(interest),
        Timing::Begin => interest
            .checked_div(Decimal::ONE + rate)
            .ok_or_else(|| overflow("IPMT")),
    }
}

/// Principal portion of payment number `per` (1-based).
pub fn ppmt(
    rate: Rate,
    per: u32,
    pmt: Money,
    present_value: Money,
    timing: Timing,
) -> HomefinResult<Money> {
    pmt.checked_sub(ipmt(rate, per, pmt, present_value, timing)?)
        .ok_or_else(|| overflow("PPMT"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pv_basic() {
        let result = pv(dec!(0.08), dec!(10), dec!(-100), dec!(0), Timing::End).unwrap();
        // PV of annuity: 100 * (1 - 1/1.08^10) / 0.08 = ~671
        assert!((result - dec!(671.01)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pv_zero_rate() {
        let result = pv(dec!(0), dec!(240), dec!(-1000), dec!(0), Timing::End).unwrap();
        assert_eq!(result, dec!(240000));
    }

    #[test]
    fn test_fv_savings_plan() {
        // 100 deposited monthly on top of 100 upfront, 5% p.a. for 10 years
        let result = fv(
            monthly_rate(dec!(0.05)),
            dec!(120),
            dec!(-100),
            dec!(-100),
            Timing::End,
        )
        .unwrap();
        assert!((result - dec!(15692.93)).abs() < dec!(0.01));
    }

    #[test]
    fn test_fv_begin_exceeds_end() {
        let rate = monthly_rate(dec!(0.05));
        let end = fv(rate, dec!(12), dec!(-100), dec!(0), Timing::End).unwrap();
        let begin = fv(rate, dec!(12), dec!(-100), dec!(0), Timing::Begin).unwrap();
        // Annuity due earns one extra period of interest on every deposit
        assert!((begin - end * (Decimal::ONE + rate)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_pmt_mortgage() {
        // 200,000 over 15 years at 7.5% p.a.
        let result = pmt(
            monthly_rate(dec!(0.075)),
            dec!(180),
            dec!(200000),
            dec!(0),
            Timing::End,
        )
        .unwrap();
        assert!((result - dec!(-1854.02)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_rejects_zero_periods() {
        let err = pmt(dec!(0.01), dec!(0), dec!(1000), dec!(0), Timing::End).unwrap_err();
        assert!(matches!(err, HomefinError::InvalidInput { .. }));
    }

    #[test]
    fn test_nper_car_loan() {
        // 8,000 repaid at 150 per month, 7% p.a.
        let result = nper(monthly_rate(dec!(0.07)), dec!(-150), dec!(8000), dec!(0), Timing::End)
            .unwrap()
            .finite()
            .unwrap();
        assert!((result - dec!(64.0733)).abs() < dec!(0.001));
    }

    #[test]
    fn test_nper_zero_rate() {
        let result = nper(dec!(0), dec!(-2000), dec!(500000), dec!(0), Timing::End).unwrap();
        assert_eq!(result, PeriodCount::Finite(dec!(250)));
    }

    #[test]
    fn test_nper_payment_equal_to_interest_is_infinite() {
        // 1% monthly on 100,000 is exactly 1,000
        let result = nper(dec!(0.01), dec!(-1000), dec!(100000), dec!(0), Timing::End).unwrap();
        assert_eq!(result, PeriodCount::Infinite);
    }

    #[test]
    fn test_nper_payment_below_interest_is_nan() {
        let result = nper(dec!(0.01), dec!(-500), dec!(100000), dec!(0), Timing::End).unwrap();
        assert_eq!(result, PeriodCount::NotANumber);
        assert_eq!(result.solvable(), None);
    }

    #[test]
    fn test_nper_zero_payment() {
        let with_rate = nper(dec!(0.01), dec!(0), dec!(1000), dec!(0), Timing::End).unwrap();
        assert!(!with_rate.is_finite());
        let without_rate = nper(dec!(0), dec!(0), dec!(1000), dec!(0), Timing::End).unwrap();
        assert_eq!(without_rate, PeriodCount::Infinite);
    }

    #[test]
    fn test_nper_inflow_payment_is_negative() {
        // A positive payment grows the loan instead of reducing it
        let result = nper(dec!(0.01), dec!(500), dec!(10000), dec!(0), Timing::End).unwrap();
        let n = result.finite().unwrap();
        assert!(n < Decimal::ZERO);
        assert_eq!(result.solvable(), None);
    }

    #[test]
    fn test_nper_pmt_round_trip() {
        let rate = monthly_rate(dec!(0.035));
        let payment = pmt(rate, dec!(300), dec!(250000), dec!(0), Timing::Begin).unwrap();
        let n = nper(rate, payment, dec!(250000), dec!(0), Timing::Begin)
            .unwrap()
            .finite()
            .unwrap();
        assert!((n - dec!(300)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_ipmt_first_period_end() {
        let interest = ipmt(monthly_rate(dec!(0.04)), 1, dec!(-2000), dec!(500000), Timing::End).unwrap();
        assert!((interest - dec!(-1666.6667)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_ipmt_first_period_begin_is_zero() {
        let interest =
            ipmt(monthly_rate(dec!(0.04)), 1, dec!(-2000), dec!(500000), Timing::Begin).unwrap();
        assert_eq!(interest, Decimal::ZERO);
    }

    #[test]
    fn test_ipmt_rejects_period_zero() {
        assert!(ipmt(dec!(0.01), 0, dec!(-100), dec!(1000), Timing::End).is_err());
    }

    #[test]
    fn test_ipmt_plus_ppmt_equals_payment() {
        let rate = monthly_rate(dec!(0.03));
        for per in [1u32, 12, 120, 240] {
            for timing in [Timing::End, Timing::Begin] {
                let i = ipmt(rate, per, dec!(-1500), dec!(300000), timing).unwrap();
                let p = ppmt(rate, per, dec!(-1500), dec!(300000), timing).unwrap();
                assert!((i + p - dec!(-1500)).abs() < dec!(0.0000000001));
            }
        }
    }

    #[test]
    fn test_rate_below_minus_one_rejected() {
        assert!(fv(dec!(-1), dec!(12), dec!(-100), dec!(0), Timing::End).is_err());
        assert!(nper(dec!(-1.5), dec!(-100), dec!(1000), dec!(0), Timing::End).is_err());
    }

    #[test]
    fn test_tiny_rate_with_large_payment_overflows_cleanly() {
        // z = pmt / r leaves the Decimal range
        let rate = monthly_rate(dec!(0.000000000000000000000001));
        let err = nper(rate, dec!(-1000000), dec!(1000000000), dec!(0), Timing::End).unwrap_err();
        assert!(matches!(err, HomefinError::Overflow { ref context } if context == "NPER annuity term"));
    }

    #[test]
    fn test_huge_principal_overflows_cleanly() {
        let max = Decimal::MAX;
        assert!(matches!(
            fv(dec!(0.5), dec!(12), dec!(-100), max, Timing::End),
            Err(HomefinError::Overflow { .. })
        ));
        assert!(matches!(
            pmt(dec!(0.5), dec!(12), max, dec!(0), Timing::End),
            Err(HomefinError::Overflow { .. })
        ));
        assert!(matches!(
            pv(dec!(0), dec!(12), max, dec!(0), Timing::End),
            Err(HomefinError::Overflow { .. })
        ));
    }

    #[test]
    fn test_growth_factor_fractional_matches_whole() {
        let whole = growth_factor(dec!(0.01), dec!(24)).unwrap();
        let via_powd = (Decimal::ONE + dec!(0.01)).powd(dec!(24));
        assert!((whole - via_powd).abs() < dec!(0.0000001));
        let half = growth_factor(dec!(0.01), dec!(0.5)).unwrap();
        assert!((half * half - dec!(1.01)).abs() < dec!(0.0000001));
    }
}
