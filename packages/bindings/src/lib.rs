use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rentfolio_core::metrics::{self, MetricsParams};
use rentfolio_core::mortgage::{self, MortgageRecord};
use rentfolio_core::opex::{self, OpexContext, PeriodAmount, PropertyLike};
use rentfolio_core::projections::{self, IncomeSafetyInput, WealthBuildInput};
use rentfolio_core::rent_roll::{self, LeaseFilter, LeaseSnapshot, RentRollInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<'a, T: Deserialize<'a>>(input_json: &'a str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn render<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// OPEX
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct OpexRequest {
    #[serde(default)]
    property: PropertyLike,
    #[serde(default, alias = "ctx")]
    context: OpexContext,
}

#[derive(Deserialize)]
struct IncludeRequest {
    #[serde(default)]
    amount: Option<PeriodAmount>,
    #[serde(default, alias = "ctx")]
    context: OpexContext,
}

#[derive(Deserialize)]
struct SalePrice {
    #[serde(default, alias = "salePrice")]
    sale_price: Option<Decimal>,
}

#[napi]
pub fn to_monthly(input_json: String) -> NapiResult<String> {
    let amount: Option<PeriodAmount> = parse(&input_json)?;
    render(&opex::to_monthly(amount.as_ref()))
}

#[napi]
pub fn include_line(input_json: String) -> NapiResult<String> {
    let req: IncludeRequest = parse(&input_json)?;
    render(&opex::include(req.amount.as_ref(), &req.context))
}

#[napi]
pub fn legacy_taxes(input_json: String) -> NapiResult<String> {
    let property: PropertyLike = parse(&input_json)?;
    render(&opex::legacy_taxes(&property))
}

#[napi]
pub fn legacy_insurance(input_json: String) -> NapiResult<String> {
    let property: PropertyLike = parse(&input_json)?;
    render(&opex::legacy_insurance(&property))
}

#[napi]
pub fn monthly_opex(input_json: String) -> NapiResult<String> {
    let req: OpexRequest = parse(&input_json)?;
    render(&opex::monthly_for_property(&req.property, &req.context))
}

#[napi]
pub fn opex_breakdown(input_json: String) -> NapiResult<String> {
    let req: OpexRequest = parse(&input_json)?;
    render(&opex::opex_breakdown(&req.property, &req.context))
}

#[napi]
pub fn estimate_property_taxes(input_json: String) -> NapiResult<String> {
    let req: SalePrice = parse(&input_json)?;
    render(&opex::estimate_property_taxes(req.sale_price))
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RatioRequest {
    numerator: Decimal,
    denominator: Decimal,
}

#[derive(Deserialize)]
struct IrrRequest {
    #[serde(alias = "propertyValue")]
    property_value: Decimal,
    #[serde(alias = "cashFlowAnnual")]
    cash_flow_annual: Decimal,
    #[serde(alias = "investedEquity")]
    invested_equity: Decimal,
}

#[napi]
pub fn noi_annual(input_json: String) -> NapiResult<String> {
    let params: MetricsParams = parse(&input_json)?;
    render(&metrics::noi_annual(
        params.monthly_rent,
        &params.property,
        &params.context,
    ))
}

#[napi]
pub fn cap_rate(input_json: String) -> NapiResult<String> {
    let r: RatioRequest = parse(&input_json)?;
    render(&metrics::cap_rate(r.numerator, r.denominator))
}

#[napi]
pub fn roi_annual(input_json: String) -> NapiResult<String> {
    let r: RatioRequest = parse(&input_json)?;
    render(&metrics::roi_annual(r.numerator, r.denominator))
}

#[napi]
pub fn dcr(input_json: String) -> NapiResult<String> {
    let r: RatioRequest = parse(&input_json)?;
    render(&metrics::dcr(r.numerator, r.denominator))
}

#[napi]
pub fn cash_on_cash(input_json: String) -> NapiResult<String> {
    let r: RatioRequest = parse(&input_json)?;
    render(&metrics::cash_on_cash(r.numerator, r.denominator))
}

#[napi]
pub fn irr_10_year(input_json: String) -> NapiResult<String> {
    let r: IrrRequest = parse(&input_json)?;
    render(&metrics::irr_10_year(
        r.property_value,
        r.cash_flow_annual,
        r.invested_equity,
    ))
}

#[napi]
pub fn metrics_summary(input_json: String) -> NapiResult<String> {
    let params: MetricsParams = parse(&input_json)?;
    render(&metrics::summary(&params))
}

#[napi]
pub fn analyze_property(input_json: String) -> NapiResult<String> {
    let params: MetricsParams = parse(&input_json)?;
    render(&metrics::analyze_property(&params))
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoanTerms {
    principal: Decimal,
    interest_rate: Decimal,
    term_months: u32,
    #[serde(default)]
    months_paid: u32,
}

#[napi]
pub fn amortizing_payment(input_json: String) -> NapiResult<String> {
    let t: LoanTerms = parse(&input_json)?;
    let payment = mortgage::amortizing_payment(t.principal, t.interest_rate, t.term_months)
        .map_err(to_napi_error)?;
    render(&payment)
}

#[napi]
pub fn balance_after(input_json: String) -> NapiResult<String> {
    let t: LoanTerms = parse(&input_json)?;
    let balance =
        mortgage::balance_after(t.principal, t.interest_rate, t.term_months, t.months_paid)
            .map_err(to_napi_error)?;
    render(&balance)
}

#[napi]
pub fn annual_debt_service(input_json: String) -> NapiResult<String> {
    let mortgages: Vec<MortgageRecord> = parse(&input_json)?;
    render(&mortgage::annual_debt_service(&mortgages))
}

#[napi]
pub fn amortization_summary(input_json: String) -> NapiResult<String> {
    let record: MortgageRecord = parse(&input_json)?;
    let output = mortgage::amortization_summary(&record).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RentProjectionRequest {
    current_rent: Decimal,
    #[serde(default)]
    growth_rate: Decimal,
    start_year: i32,
}

#[napi]
pub fn rent_projection(input_json: String) -> NapiResult<String> {
    let r: RentProjectionRequest = parse(&input_json)?;
    render(&projections::rent_projection(
        r.current_rent,
        r.growth_rate,
        r.start_year,
    ))
}

#[napi]
pub fn income_and_safety(input_json: String) -> NapiResult<String> {
    let input: IncomeSafetyInput = parse(&input_json)?;
    render(&projections::income_and_safety(&input))
}

#[napi]
pub fn wealth_build(input_json: String) -> NapiResult<String> {
    let input: WealthBuildInput = parse(&input_json)?;
    let output = projections::wealth_build(&input).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Rent roll
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FilterRequest {
    leases: Vec<LeaseSnapshot>,
    #[serde(default)]
    filter: LeaseFilter,
}

#[napi]
pub fn build_rent_roll(input_json: String) -> NapiResult<String> {
    let input: RentRollInput = parse(&input_json)?;
    let output = rent_roll::build_rent_roll(&input).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn filter_leases(input_json: String) -> NapiResult<String> {
    let req: FilterRequest = parse(&input_json)?;
    render(&rent_roll::filter_leases(&req.leases, req.filter))
}
