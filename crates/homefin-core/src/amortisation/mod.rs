pub mod batch;
pub mod schedule;

pub use batch::{batch_compute, compare_scenarios, BatchEntry};
pub use schedule::{
    amortise, build_schedule, compute_period_count, loan_term, max_principal, present_value,
    LoanTerm, Period, PeriodRounding, Scenario, Schedule, ScheduleOptions, ScheduleOutcome,
    Unsolvable, UnsolvableReason,
};
