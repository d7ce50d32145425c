use homefin_core::amortisation::{
    batch_compute, build_schedule, compute_period_count, present_value, PeriodRounding, Scenario,
    Schedule, ScheduleOptions, ScheduleOutcome, UnsolvableReason,
};
use homefin_core::time_value::PeriodCount;
use homefin_core::{HomefinError, Timing};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

fn settle() -> ScheduleOptions {
    ScheduleOptions {
        rounding: PeriodRounding::Settle,
        ..Default::default()
    }
}

fn schedule_of(outcome: ScheduleOutcome) -> Schedule {
    match outcome {
        ScheduleOutcome::Solved(s) => s,
        ScheduleOutcome::Unsolvable(u) => panic!("unexpected unsolvable scenario: {}", u.message),
    }
}

/// A spread of solvable loans with both timing conventions and balloons.
fn solvable_scenarios() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for (rate, payment, principal) in [
        (dec!(0.04), dec!(-2000), dec!(500000)),
        (dec!(0.015), dec!(-950), dec!(210000)),
        (dec!(0.0625), dec!(-3100), dec!(420000)),
        (dec!(0), dec!(-1250), dec!(90000)),
    ] {
        for timing in [Timing::End, Timing::Begin] {
            for residual in [dec!(0), dec!(25000)] {
                scenarios.push(
                    Scenario::new(rate, payment, principal)
                        .with_timing(timing)
                        .with_residual_value(residual),
                );
            }
        }
    }
    scenarios
}

// ===========================================================================
// Reference loan: 500,000 at 4% p.a., 2,000 per month
// ===========================================================================

#[test]
fn test_reference_loan_first_period() {
    let schedule = schedule_of(
        build_schedule(
            &Scenario::new(dec!(0.04), dec!(-2000), dec!(500000)),
            &ScheduleOptions::default(),
        )
        .unwrap(),
    );

    let first = &schedule.periods[0];
    assert_eq!(first.period, 1);
    assert!((first.interest_portion - dec!(-1666.67)).abs() < dec!(0.005));
    assert!((first.principal_portion - dec!(-333.33)).abs() < dec!(0.005));
}

#[test]
fn test_reference_loan_length_and_payoff() {
    let schedule = schedule_of(
        build_schedule(&Scenario::new(dec!(0.04), dec!(-2000), dec!(500000)), &settle()).unwrap(),
    );
    // Several hundred periods, about 45 years
    assert_eq!(schedule.periods.len(), 539);
    assert!(schedule.final_residual_debt.abs() < dec!(0.000001));
    // Everything paid beyond the principal is interest
    assert!((schedule.total_paid - schedule.total_interest + dec!(500000)).abs() < dec!(0.000001));
    assert!(schedule.total_interest < dec!(-570000) && schedule.total_interest > dec!(-580000));
}

// ===========================================================================
// Invariants across many scenarios
// ===========================================================================

#[test]
fn test_final_residual_matches_target() {
    for scenario in solvable_scenarios() {
        let schedule = schedule_of(build_schedule(&scenario, &settle()).unwrap());
        let tolerance = scenario.principal * dec!(0.000001);
        assert!(
            (schedule.final_residual_debt - scenario.residual_value).abs() <= tolerance,
            "{scenario:?} ended at {}",
            schedule.final_residual_debt
        );
    }
}

#[test]
fn test_full_periods_sum_to_payment() {
    for scenario in solvable_scenarios() {
        let schedule = schedule_of(build_schedule(&scenario, &ScheduleOptions::default()).unwrap());
        for p in &schedule.periods {
            assert!(
                (p.interest_portion + p.principal_portion - scenario.payment).abs() < dec!(0.0000001),
                "{scenario:?} period {}",
                p.period
            );
        }
    }
}

#[test]
fn test_cumulative_interest_matches_sum() {
    for scenario in solvable_scenarios() {
        let schedule = schedule_of(build_schedule(&scenario, &settle()).unwrap());
        for (i, p) in schedule.periods.iter().enumerate() {
            let sum: Decimal = schedule.periods[..=i].iter().map(|q| q.interest_portion).sum();
            assert_eq!(p.cumulative_interest, sum);
        }
    }
}

#[test]
fn test_residual_debt_strictly_decreasing() {
    for scenario in solvable_scenarios() {
        let schedule = schedule_of(build_schedule(&scenario, &ScheduleOptions::default()).unwrap());
        let mut previous = scenario.principal;
        for p in &schedule.periods {
            assert!(p.residual_debt < previous, "{scenario:?} period {}", p.period);
            previous = p.residual_debt;
        }
    }
}

#[test]
fn test_rebuild_is_identical() {
    for scenario in solvable_scenarios() {
        let first = build_schedule(&scenario, &ScheduleOptions::default()).unwrap();
        let second = build_schedule(&scenario, &ScheduleOptions::default()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_rounding_policies_share_full_periods() {
    let scenario = Scenario::new(dec!(0.035), dec!(-1800), dec!(350000));
    let floor = schedule_of(build_schedule(&scenario, &ScheduleOptions::default()).unwrap());
    let ceil = schedule_of(
        build_schedule(
            &scenario,
            &ScheduleOptions {
                rounding: PeriodRounding::Ceil,
                ..Default::default()
            },
        )
        .unwrap(),
    );
    let settled = schedule_of(build_schedule(&scenario, &settle()).unwrap());

    assert_eq!(ceil.periods.len(), floor.periods.len() + 1);
    assert_eq!(settled.periods.len(), floor.periods.len() + 1);
    assert_eq!(&ceil.periods[..floor.periods.len()], &floor.periods[..]);
    assert_eq!(&settled.periods[..floor.periods.len()], &floor.periods[..]);
}

// ===========================================================================
// Unsolvable detection
// ===========================================================================

#[test]
fn test_payment_below_interest_reported() {
    let scenario = Scenario::new(dec!(0.05), dec!(-1000), dec!(500000));
    let count = compute_period_count(
        scenario.annual_rate,
        scenario.payment,
        scenario.principal,
        scenario.residual_value,
        scenario.timing,
    )
    .unwrap();
    assert!(!count.is_finite());

    let outcome = build_schedule(&scenario, &ScheduleOptions::default()).unwrap();
    assert!(outcome.schedule().is_none());
    let unsolvable = outcome.unsolvable().unwrap();
    assert_eq!(unsolvable.annual_rate, dec!(0.05));
    assert_eq!(unsolvable.reason, UnsolvableReason::PaymentBelowInterest);
}

#[test]
fn test_empty_schedule_differs_from_unsolvable() {
    let empty = build_schedule(
        &Scenario::new(dec!(0.05), dec!(-1000), dec!(0)),
        &ScheduleOptions::default(),
    )
    .unwrap();
    let schedule = empty.schedule().expect("nothing to repay is a valid schedule");
    assert!(schedule.periods.is_empty());
    assert_eq!(schedule.period_count, Decimal::ZERO);
}

#[test]
fn test_period_count_exposes_non_finite_variants() {
    let infinite =
        compute_period_count(dec!(0.12), dec!(-1000), dec!(100000), dec!(0), Timing::End).unwrap();
    assert_eq!(infinite, PeriodCount::Infinite);
    let nan =
        compute_period_count(dec!(0.12), dec!(-900), dec!(100000), dec!(0), Timing::End).unwrap();
    assert_eq!(nan, PeriodCount::NotANumber);
}

// ===========================================================================
// Batch
// ===========================================================================

#[test]
fn test_batch_rates_lengthen_payoff() {
    let scenarios: Vec<Scenario> = [dec!(0.02), dec!(0.03), dec!(0.04), dec!(0.045)]
        .into_iter()
        .map(|rate| Scenario::new(rate, dec!(-2000), dec!(500000)))
        .collect();
    let entries = batch_compute(&scenarios, &ScheduleOptions::default());

    let lengths: Vec<usize> = entries
        .iter()
        .map(|e| e.outcome.as_ref().unwrap().schedule().unwrap().periods.len())
        .collect();
    assert_eq!(lengths, vec![323, 392, 538, 740]);
    assert!(lengths.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_batch_unsolvable_rate_is_isolated() {
    let scenarios: Vec<Scenario> = [dec!(0.02), dec!(0.03), dec!(0.055), dec!(0.045)]
        .into_iter()
        .map(|rate| Scenario::new(rate, dec!(-2000), dec!(500000)))
        .collect();
    let entries = batch_compute(&scenarios, &ScheduleOptions::default());

    let solved: Vec<bool> = entries
        .iter()
        .map(|e| e.outcome.as_ref().unwrap().is_solved())
        .collect();
    assert_eq!(solved, vec![true, true, false, true]);
    assert_eq!(
        entries[2].outcome.as_ref().unwrap().unsolvable().unwrap().annual_rate,
        dec!(0.055)
    );
}

#[test]
fn test_batch_overflowing_scenario_is_isolated() {
    let scenarios = vec![
        Scenario::new(dec!(0.000000000000000000000001), dec!(-1000000), dec!(1000000000)),
        Scenario::new(dec!(0.04), dec!(-2000), dec!(500000)),
    ];
    let entries = batch_compute(&scenarios, &ScheduleOptions::default());
    assert!(matches!(entries[0].outcome, Err(HomefinError::Overflow { .. })));
    assert!(entries[1].outcome.as_ref().unwrap().is_solved());
}

#[test]
fn test_concurrent_callers_agree() {
    let scenarios = solvable_scenarios();
    let sequential = batch_compute(&scenarios, &settle());

    let handles: Vec<_> = scenarios
        .iter()
        .cloned()
        .map(|scenario| std::thread::spawn(move || build_schedule(&scenario, &settle()).unwrap()))
        .collect();

    for (handle, entry) in handles.into_iter().zip(sequential.iter()) {
        let threaded = handle.join().unwrap();
        assert_eq!(&threaded, entry.outcome.as_ref().unwrap());
    }
}

// ===========================================================================
// Present value
// ===========================================================================

#[test]
fn test_present_value_round_trips_schedule() {
    let principal = present_value(dec!(0.04), dec!(300), dec!(-2000), dec!(0), Timing::End).unwrap();
    let schedule = schedule_of(
        build_schedule(&Scenario::new(dec!(0.04), dec!(-2000), principal), &settle()).unwrap(),
    );
    assert!((schedule.period_count - dec!(300)).abs() < dec!(0.0001));
}
