use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortisation
// ---------------------------------------------------------------------------

#[napi]
pub fn amortise(input_json: String) -> NapiResult<String> {
    let input: homefin_core::amortisation::schedule::AmortisationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        homefin_core::amortisation::schedule::amortise(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let input: homefin_core::amortisation::batch::ScenarioComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        homefin_core::amortisation::batch::compare_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Payoff period of a scenario; the input is a single scenario object.
#[napi]
pub fn loan_term(input_json: String) -> NapiResult<String> {
    let scenario: homefin_core::amortisation::schedule::Scenario =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let term = homefin_core::amortisation::schedule::loan_term(
        scenario.annual_rate,
        scenario.payment,
        scenario.principal,
        scenario.residual_value,
        scenario.timing,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&term).map_err(to_napi_error)
}

#[napi]
pub fn max_principal(input_json: String) -> NapiResult<String> {
    let input: homefin_core::amortisation::schedule::PresentValueInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        homefin_core::amortisation::schedule::max_principal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Affordability
// ---------------------------------------------------------------------------

#[napi]
pub fn project_assets(input_json: String) -> NapiResult<String> {
    let input: homefin_core::affordability::budget::AssetProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        homefin_core::affordability::budget::project_assets(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn affordable_payment(input_json: String) -> NapiResult<String> {
    let input: homefin_core::affordability::budget::MonthlyBudgetInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = homefin_core::affordability::budget::affordable_payment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn fixed_price_plan(input_json: String) -> NapiResult<String> {
    let input: homefin_core::affordability::purchase::FixedPricePlanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = homefin_core::affordability::purchase::fixed_price_plan(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn fixed_term_plan(input_json: String) -> NapiResult<String> {
    let input: homefin_core::affordability::purchase::FixedTermPlanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = homefin_core::affordability::purchase::fixed_term_plan(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
