//! Side-by-side amortisation of independent loan scenarios.
//!
//! Every scenario is evaluated on its own; an invalid or unsolvable entry
//! never prevents the others from producing a schedule.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{
    build_schedule, Scenario, Schedule, ScheduleOptions, ScheduleOutcome, Unsolvable,
};
use crate::error::HomefinError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Timing};
use crate::HomefinResult;

/// Outcome for one scenario of a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub scenario: Scenario,
    pub outcome: HomefinResult<ScheduleOutcome>,
}

/// Amortise each scenario independently, preserving input order.
pub fn batch_compute(scenarios: &[Scenario], options: &ScheduleOptions) -> Vec<BatchEntry> {
    scenarios
        .iter()
        .map(|scenario| {
            let outcome = build_schedule(scenario, options);
            if let Err(e) = &outcome {
                log::warn!("amortisation: rejected scenario at {} p.a.: {e}", scenario.annual_rate);
            }
            BatchEntry {
                scenario: scenario.clone(),
                outcome,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rate comparison
// ---------------------------------------------------------------------------

/// Several credit rates applied to one principal and monthly payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparisonInput {
    pub annual_rates: Vec<Rate>,
    pub payment: Money,
    pub principal: Money,
    #[serde(default)]
    pub residual_value: Money,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub options: ScheduleOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Solved(Schedule),
    Unsolvable(Unsolvable),
    Rejected { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub annual_rate: Rate,
    pub outcome: ComparisonOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparisonOutput {
    pub entries: Vec<ComparisonEntry>,
    pub solved_count: usize,
    /// Rate with the lowest total interest among solved entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheapest_rate: Option<Rate>,
}

/// Amortise the same loan at several rates and report each outcome.
pub fn compare_scenarios(
    input: &ScenarioComparisonInput,
) -> HomefinResult<ComputationOutput<ScenarioComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_rates.is_empty() {
        return Err(HomefinError::InvalidInput {
            field: "annual_rates".into(),
            reason: "At least one rate is required".into(),
        });
    }

    let scenarios: Vec<Scenario> = input
        .annual_rates
        .iter()
        .map(|rate| {
            Scenario::new(*rate, input.payment, input.principal)
                .with_residual_value(input.residual_value)
                .with_timing(input.timing)
        })
        .collect();

    let entries: Vec<ComparisonEntry> = batch_compute(&scenarios, &input.options)
        .into_iter()
        .map(|entry| {
            let outcome = match entry.outcome {
                Ok(ScheduleOutcome::Solved(schedule)) => ComparisonOutcome::Solved(schedule),
                Ok(ScheduleOutcome::Unsolvable(unsolvable)) => {
                    warnings.push(format!(
                        "{} p.a.: {}",
                        entry.scenario.annual_rate, unsolvable.message
                    ));
                    ComparisonOutcome::Unsolvable(unsolvable)
                }
                Err(e) => {
                    warnings.push(format!("{} p.a.: {e}", entry.scenario.annual_rate));
                    ComparisonOutcome::Rejected {
                        error: e.to_string(),
                    }
                }
            };
            ComparisonEntry {
                annual_rate: entry.scenario.annual_rate,
                outcome,
            }
        })
        .collect();

    let solved: Vec<(Rate, &Schedule)> = entries
        .iter()
        .filter_map(|e| match &e.outcome {
            ComparisonOutcome::Solved(s) => Some((e.annual_rate, s)),
            _ => None,
        })
        .collect();
    let solved_count = solved.len();
    // Interest is an outflow, so the cheapest schedule has the largest total
    let cheapest_rate = solved
        .iter()
        .max_by_key(|(_, s)| s.total_interest)
        .map(|(rate, _)| *rate);

    let output = ScenarioComparisonOutput {
        entries,
        solved_count,
        cheapest_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Closed-form annuity amortisation per rate (monthly periods, annual nominal rate / 12)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
