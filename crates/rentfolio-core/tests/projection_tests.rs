#![cfg(feature = "projections")]

use rentfolio_core::metrics::{self, MetricsParams};
use rentfolio_core::mortgage::{self, MortgageRecord};
use rentfolio_core::opex::{OpexContext, PropertyLike};
use rentfolio_core::projections::{self, IncomeSafetyInput, SafetyGuidance, WealthBuildInput};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

// ===========================================================================
// Dashboard flow: OPEX and NOI feeding the mortgage-aware projections
// ===========================================================================

fn loan() -> MortgageRecord {
    MortgageRecord {
        loan_name: Some("Purchase loan".into()),
        principal: dec!(240000),
        interest_rate: dec!(6),
        term_months: 360,
        monthly_payment: dec!(1438.92),
        start_date: None,
    }
}

fn params() -> MetricsParams {
    let property = PropertyLike {
        mgmt_pct: Some(dec!(8)),
        maintenance_pct: Some(dec!(5)),
        property_taxes: Some(dec!(200)),
        insurance: Some(dec!(100)),
        ..Default::default()
    };
    MetricsParams {
        monthly_rent: dec!(2000),
        property,
        context: OpexContext::new(dec!(2000)),
        property_value: dec!(300000),
        debt_service_annual: Some(mortgage::annual_debt_service(&[loan()])),
        invested_equity: Some(dec!(60000)),
    }
}

#[test]
fn test_debt_service_from_mortgage_rows_feeds_dcr() {
    let s = metrics::summary(&params());
    // 17280 / 17267.04
    assert!(s.dcr > dec!(1.0007) && s.dcr < dec!(1.0008), "got {}", s.dcr);
}

#[test]
fn test_income_safety_from_dashboard_figures() {
    let out = projections::income_and_safety(&IncomeSafetyInput {
        current_rent: dec!(2000),
        rent_growth_rate: dec!(3),
        opex: dec!(560),
        opex_inflation_rate: dec!(2.5),
        debt_service: dec!(1438.92),
    });
    let r = &out.result;
    // Year 1: 24000 vs 6720 + 17267.04
    assert!((r.years[0].free_cash_flow - dec!(12.96)).abs() < dec!(0.0001));
    assert!(r.years[9].free_cash_flow > r.years[0].free_cash_flow);
    assert_eq!(r.guidance, SafetyGuidance::from_margin(r.final_margin_pct));
    assert_eq!(r.guidance_text, r.guidance.describe());
}

#[test]
fn test_wealth_build_equity_grows_with_paydown() {
    let noi = metrics::summary(&params()).noi;
    let out = projections::wealth_build(&WealthBuildInput {
        monthly_noi: noi / dec!(12),
        cap_rate: dec!(5.76),
        mortgages: vec![loan()],
    })
    .unwrap();
    let points = &out.result;
    assert_eq!(points.len(), 121);
    assert_eq!(points[0].equity, dec!(60000));
    let month_60 = mortgage::balance_after(dec!(240000), dec!(6), 360, 60).unwrap();
    assert_eq!(
        points[60].loan_balance,
        month_60.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    );
    assert!(points.windows(2).all(|w| w[1].equity >= w[0].equity));
}

#[test]
fn test_wealth_build_zero_term_loan_is_paid_off() {
    let mut bad = loan();
    bad.term_months = 0;
    let out = projections::wealth_build(&WealthBuildInput {
        monthly_noi: dec!(1440),
        cap_rate: dec!(5.76),
        mortgages: vec![bad],
    })
    .unwrap();
    assert!(out.result.iter().all(|p| p.loan_balance == Decimal::ZERO));
}
