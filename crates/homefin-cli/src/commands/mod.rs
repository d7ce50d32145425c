pub mod affordability;
pub mod amortisation;

use clap::ValueEnum;

use homefin_core::amortisation::PeriodRounding;
use homefin_core::Timing;

/// Payment timing within each monthly period
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TimingArg {
    /// Start of period (annuity due)
    Begin,
    /// End of period (ordinary annuity)
    End,
}

impl From<TimingArg> for Timing {
    fn from(arg: TimingArg) -> Self {
        match arg {
            TimingArg::Begin => Timing::Begin,
            TimingArg::End => Timing::End,
        }
    }
}

/// How a fractional payoff period becomes whole table rows
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoundingArg {
    /// Drop the final partial period
    Floor,
    /// Add one more full payment
    Ceil,
    /// Add one reduced payment landing on the residual value
    Settle,
}

impl From<RoundingArg> for PeriodRounding {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::Floor => PeriodRounding::Floor,
            RoundingArg::Ceil => PeriodRounding::Ceil,
            RoundingArg::Settle => PeriodRounding::Settle,
        }
    }
}
