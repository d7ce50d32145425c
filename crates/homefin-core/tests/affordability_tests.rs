use homefin_core::affordability::budget::{
    affordable_payment, project_assets, AssetProjectionInput, MonthlyBudgetInput,
};
use homefin_core::affordability::purchase::{
    fixed_price_plan, fixed_term_plan, AncillaryCosts, FixedPricePlanInput, FixedTermPlanInput,
};
use homefin_core::amortisation::{build_schedule, LoanTerm, Scenario, ScheduleOptions};
use homefin_core::Timing;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn household() -> MonthlyBudgetInput {
    MonthlyBudgetInput {
        rent: dec!(1400),
        monthly_savings: dec!(900),
        running_cost_per_sqm: dec!(4),
        living_area_sqm: dec!(100),
    }
}

fn costs() -> AncillaryCosts {
    AncillaryCosts {
        broker_rate: dec!(0.0357),
        notary_rate: dec!(0.02),
        transfer_tax_rate: dec!(0.05),
    }
}

// ===========================================================================
// Budget feeds the purchase plans
// ===========================================================================

#[test]
fn test_budget_to_fixed_price_plan() {
    let payment = affordable_payment(&household()).unwrap().result.affordable_payment;
    assert_eq!(payment, dec!(-1900));

    let plan = fixed_price_plan(&FixedPricePlanInput {
        purchase_price: dec!(400000),
        equity: dec!(100000),
        ancillary: costs(),
        annual_rate: dec!(0.035),
        monthly_payment: payment,
        timing: Timing::End,
    })
    .unwrap();

    assert!(plan.warnings.is_empty());
    let (period_count, years) = match plan.result.loan_term {
        LoanTerm::Solved { period_count, years } => (period_count, years),
        LoanTerm::Unsolvable(u) => panic!("expected a loan term, got {}", u.message),
    };
    assert_eq!(years, period_count / dec!(12));

    // The same credit amortised at the same payment pays off in the same time
    let schedule = build_schedule(
        &Scenario::new(dec!(0.035), payment, plan.result.credit_required),
        &ScheduleOptions::default(),
    )
    .unwrap();
    assert_eq!(schedule.schedule().unwrap().period_count, period_count);
}

#[test]
fn test_budget_to_fixed_term_plan() {
    let payment = affordable_payment(&household()).unwrap().result.affordable_payment;
    let plan = fixed_term_plan(&FixedTermPlanInput {
        term_years: dec!(30),
        equity: dec!(100000),
        ancillary: costs(),
        annual_rate: dec!(0.035),
        monthly_payment: payment,
        timing: Timing::End,
    })
    .unwrap()
    .result;

    // Buying at the supported price needs exactly the serviceable credit
    let round_trip = fixed_price_plan(&FixedPricePlanInput {
        purchase_price: plan.purchase_price,
        equity: dec!(100000),
        ancillary: costs(),
        annual_rate: dec!(0.035),
        monthly_payment: payment,
        timing: Timing::End,
    })
    .unwrap()
    .result;
    assert!((round_trip.credit_required - plan.max_credit).abs() < dec!(0.0001));
    let years = round_trip.loan_term.years().unwrap();
    assert!((years - dec!(30)).abs() < dec!(0.001), "got {years}");
}

#[test]
fn test_longer_term_supports_higher_price() {
    let price_for = |term_years: Decimal| {
        fixed_term_plan(&FixedTermPlanInput {
            term_years,
            equity: dec!(50000),
            ancillary: costs(),
            annual_rate: dec!(0.04),
            monthly_payment: dec!(-1500),
            timing: Timing::End,
        })
        .unwrap()
        .result
        .purchase_price
    };
    let prices: Vec<Decimal> = [dec!(10), dec!(20), dec!(30)].into_iter().map(price_for).collect();
    assert!(prices.windows(2).all(|w| w[0] < w[1]));
}

// ===========================================================================
// Asset projection
// ===========================================================================

#[test]
fn test_larger_equity_leaves_less_to_grow() {
    let project = |equity: Decimal| {
        project_assets(&AssetProjectionInput {
            total_assets: dec!(200000),
            equity,
            annual_rate: dec!(0.05),
            years: dec!(15),
        })
        .unwrap()
        .result
    };
    let small = project(dec!(50000));
    let large = project(dec!(150000));
    assert!(small.future_value > large.future_value);
    assert!(small.gain > large.gain);
    assert_eq!(project(dec!(200000)).future_value, Decimal::ZERO);
}

#[test]
fn test_envelope_echoes_input() {
    let output = project_assets(&AssetProjectionInput {
        total_assets: dec!(150000),
        equity: dec!(100000),
        annual_rate: dec!(0.03),
        years: dec!(10),
    })
    .unwrap();
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["assumptions"]["total_assets"], "150000");
    assert!(json["methodology"].as_str().unwrap().contains("Monthly"));
}
