//! Ten-year forward views used by the dashboard charts: rent growth,
//! income vs. expense safety margin, and property value / loan balance /
//! equity build-up.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentfolioError;
use crate::mortgage::{self, MortgageRecord};
use crate::opex::round_dollars;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RentfolioResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);
const ONE_HUNDRED: Decimal = dec!(100);

pub const RENT_PROJECTION_YEARS: u32 = 10;
pub const SAFETY_PROJECTION_YEARS: u32 = 10;
pub const WEALTH_BUILD_MONTHS: u32 = 120;
/// NOI growth assumed when projecting property value.
pub const NOI_GROWTH: Decimal = dec!(1.03);

const REFINANCE_MARGIN: Decimal = dec!(30);
const DISTRIBUTE_MARGIN: Decimal = dec!(20);
const MODERATE_MARGIN: Decimal = dec!(15);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentProjectionPoint {
    pub year: i32,
    /// Projected monthly rent, whole dollars
    pub rent: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSafetyInput {
    /// Current monthly rent
    pub current_rent: Money,
    /// Annual rent growth, percent
    #[serde(default)]
    pub rent_growth_rate: Percent,
    /// Current monthly OPEX
    pub opex: Money,
    /// Annual OPEX inflation, percent
    #[serde(default)]
    pub opex_inflation_rate: Percent,
    /// Monthly debt service
    #[serde(default)]
    pub debt_service: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSafetyYear {
    pub year: u32,
    pub revenue: Money,
    pub total_expenses: Money,
    pub free_cash_flow: Money,
    /// Free cash flow over total expenses, percent
    pub margin_pct: Percent,
}

/// What the final-year margin says about spare cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyGuidance {
    /// Margin of 30% or more
    SafeToRefinance,
    /// Margin of 20% to 30%
    SafeToDistribute,
    /// Margin of 15% to 20%
    ModerateRisk,
    /// Margin under 15%
    RetainCash,
}

impl SafetyGuidance {
    pub fn from_margin(margin_pct: Percent) -> Self {
        if margin_pct >= REFINANCE_MARGIN {
            SafetyGuidance::SafeToRefinance
        } else if margin_pct >= DISTRIBUTE_MARGIN {
            SafetyGuidance::SafeToDistribute
        } else if margin_pct >= MODERATE_MARGIN {
            SafetyGuidance::ModerateRisk
        } else {
            SafetyGuidance::RetainCash
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SafetyGuidance::SafeToRefinance => "Safe to refinance (>=30% margin)",
            SafetyGuidance::SafeToDistribute => "Safe to distribute profits (20-30% margin)",
            SafetyGuidance::ModerateRisk => "Moderate risk (15-20% margin)",
            SafetyGuidance::RetainCash => "Retain cash; high risk (<15% margin)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSafetyProjection {
    pub years: Vec<IncomeSafetyYear>,
    pub final_margin_pct: Percent,
    pub guidance: SafetyGuidance,
    pub guidance_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WealthBuildInput {
    /// Current monthly NOI
    pub monthly_noi: Money,
    /// Cap rate used to turn NOI into value, percent
    pub cap_rate: Percent,
    #[serde(default)]
    pub mortgages: Vec<MortgageRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WealthBuildPoint {
    pub month: u32,
    pub property_value: Money,
    pub loan_balance: Money,
    pub equity: Money,
}

// ---------------------------------------------------------------------------
// Rent projection
// ---------------------------------------------------------------------------

/// Monthly rent compounded at `growth_rate` percent for years 0..=10.
///
/// The series stops at the first year whose rent no longer fits in a
/// `Decimal`.
pub fn rent_projection(current_rent: Money, growth_rate: Percent, start_year: i32) -> Vec<RentProjectionPoint> {
    let growth = Decimal::ONE + growth_rate / ONE_HUNDRED;
    let mut factor = Decimal::ONE;
    let mut points = Vec::with_capacity(RENT_PROJECTION_YEARS as usize + 1);

    for i in 0..=RENT_PROJECTION_YEARS {
        if i > 0 {
            factor = match factor.checked_mul(growth) {
                Some(f) => f,
                None => break,
            };
        }
        let Some(rent) = current_rent.checked_mul(factor) else {
            break;
        };
        points.push(RentProjectionPoint {
            year: start_year.saturating_add(i as i32),
            rent: round_dollars(rent),
        });
    }

    points
}

// ---------------------------------------------------------------------------
// Income & safety
// ---------------------------------------------------------------------------

/// Ten years of revenue vs. OPEX plus debt service, and the guidance band
/// for the final year's margin.
pub fn income_and_safety(input: &IncomeSafetyInput) -> ComputationOutput<IncomeSafetyProjection> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rent_growth = Decimal::ONE + input.rent_growth_rate / ONE_HUNDRED;
    let opex_growth = Decimal::ONE + input.opex_inflation_rate / ONE_HUNDRED;

    let mut rent_factor = Decimal::ONE;
    let mut opex_factor = Decimal::ONE;
    let mut years = Vec::with_capacity(SAFETY_PROJECTION_YEARS as usize);

    let mut overflow_year = None;

    for i in 0..SAFETY_PROJECTION_YEARS {
        if i > 0 {
            match rent_factor
                .checked_mul(rent_growth)
                .zip(opex_factor.checked_mul(opex_growth))
            {
                Some((rf, of)) => {
                    rent_factor = rf;
                    opex_factor = of;
                }
                None => {
                    overflow_year = Some(i + 1);
                    break;
                }
            }
        }
        match safety_year(input, i + 1, rent_factor, opex_factor) {
            Some(year) => years.push(year),
            None => {
                overflow_year = Some(i + 1);
                break;
            }
        }
    }

    if let Some(year) = overflow_year {
        warnings.push(format!(
            "Projection exceeds the decimal range in year {year}; later years omitted"
        ));
    }

    let final_margin_pct = years.last().map(|y| y.margin_pct).unwrap_or_default();
    let guidance = SafetyGuidance::from_margin(final_margin_pct);

    if years.iter().any(|y| y.total_expenses.is_zero()) {
        warnings.push("Total expenses are zero — margin reported as 0".into());
    }
    if let Some(first_negative) = years.iter().find(|y| y.free_cash_flow < Decimal::ZERO) {
        warnings.push(format!(
            "Free cash flow turns negative in year {}",
            first_negative.year
        ));
    }

    tracing::debug!(final_margin = %final_margin_pct, ?guidance, "income and safety projection");

    let output = IncomeSafetyProjection {
        years,
        final_margin_pct,
        guidance,
        guidance_text: guidance.describe().to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Ten-Year Income and Safety Margin Projection",
        input,
        warnings,
        elapsed,
        output,
    )
}

/// One projected year, or `None` when a figure leaves the decimal range.
fn safety_year(
    input: &IncomeSafetyInput,
    year: u32,
    rent_factor: Decimal,
    opex_factor: Decimal,
) -> Option<IncomeSafetyYear> {
    let revenue = input
        .current_rent
        .checked_mul(MONTHS_PER_YEAR)?
        .checked_mul(rent_factor)?;
    let opex_total = input.opex.checked_mul(MONTHS_PER_YEAR)?.checked_mul(opex_factor)?;
    let annual_debt_service = input.debt_service.checked_mul(MONTHS_PER_YEAR)?;
    let total_expenses = opex_total.checked_add(annual_debt_service)?;
    let free_cash_flow = revenue.checked_sub(total_expenses)?;
    let margin_pct = if total_expenses.is_zero() {
        Decimal::ZERO
    } else {
        free_cash_flow
            .checked_div(total_expenses)?
            .checked_mul(ONE_HUNDRED)?
    };

    Some(IncomeSafetyYear {
        year,
        revenue,
        total_expenses,
        free_cash_flow,
        margin_pct,
    })
}

// ---------------------------------------------------------------------------
// Wealth build
// ---------------------------------------------------------------------------

/// Month-by-month property value, combined loan balance and equity over ten
/// years. Value is NOI grown 3%/yr capitalised at `cap_rate`; every loan is
/// assumed to start amortising at month 0.
pub fn wealth_build(input: &WealthBuildInput) -> RentfolioResult<ComputationOutput<Vec<WealthBuildPoint>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let annual_noi = input
        .monthly_noi
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| out_of_range("monthly_noi"))?;
    let cap = input.cap_rate / ONE_HUNDRED;

    if cap <= Decimal::ZERO {
        warnings.push("Cap rate not positive — projected property value reported as 0".into());
    }

    let mut points = Vec::with_capacity(WEALTH_BUILD_MONTHS as usize + 1);

    for month in 0..=WEALTH_BUILD_MONTHS {
        let years = Decimal::from(month) / MONTHS_PER_YEAR;
        let growth = NOI_GROWTH.checked_powd(years).unwrap_or(Decimal::ONE);
        let property_value = if cap > Decimal::ZERO {
            annual_noi
                .checked_mul(growth)
                .and_then(|noi| noi.checked_div(cap))
                .ok_or_else(|| out_of_range("monthly_noi"))?
        } else {
            Decimal::ZERO
        };

        let mut loan_balance = Decimal::ZERO;
        for m in &input.mortgages {
            let balance = mortgage::balance_after(m.principal, m.interest_rate, m.term_months, month)?;
            loan_balance = loan_balance
                .checked_add(balance)
                .ok_or_else(|| out_of_range("mortgages"))?;
        }

        let equity = property_value
            .checked_sub(loan_balance)
            .ok_or_else(|| out_of_range("mortgages"))?;

        points.push(WealthBuildPoint {
            month,
            property_value: round_dollars(property_value),
            loan_balance: round_dollars(loan_balance),
            equity: round_dollars(equity),
        });
    }

    if let Some(first) = points.first() {
        if first.equity < Decimal::ZERO {
            warnings.push("Loan balance exceeds projected value at month 0 — negative equity".into());
        }
    }

    tracing::debug!(
        months = points.len(),
        mortgages = input.mortgages.len(),
        "wealth build projection"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Ten-Year Wealth Build (NOI-capitalised value less amortising debt)",
        input,
        warnings,
        elapsed,
        points,
    ))
}

fn out_of_range(field: &str) -> RentfolioError {
    RentfolioError::InvalidInput {
        field: field.into(),
        reason: "Projection leaves the supported decimal range".into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rent_projection_compounds_and_rounds() {
        let points = rent_projection(dec!(2000), dec!(3), 2025);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0], RentProjectionPoint { year: 2025, rent: dec!(2000) });
        assert_eq!(points[1].rent, dec!(2060));
        assert_eq!(points[2].rent, dec!(2122)); // 2121.80
        assert_eq!(points[10].year, 2035);
        assert_eq!(points[10].rent, dec!(2688)); // 2687.83
    }

    #[test]
    fn test_rent_projection_zero_growth_is_flat() {
        let points = rent_projection(dec!(1500), Decimal::ZERO, 2030);
        assert!(points.iter().all(|p| p.rent == dec!(1500)));
    }

    #[test]
    fn test_safety_guidance_bands() {
        assert_eq!(SafetyGuidance::from_margin(dec!(30)), SafetyGuidance::SafeToRefinance);
        assert_eq!(SafetyGuidance::from_margin(dec!(29.99)), SafetyGuidance::SafeToDistribute);
        assert_eq!(SafetyGuidance::from_margin(dec!(15)), SafetyGuidance::ModerateRisk);
        assert_eq!(SafetyGuidance::from_margin(dec!(-4)), SafetyGuidance::RetainCash);
    }

    #[test]
    fn test_income_and_safety_flat_case() {
        let input = IncomeSafetyInput {
            current_rent: dec!(2000),
            rent_growth_rate: Decimal::ZERO,
            opex: dec!(560),
            opex_inflation_rate: Decimal::ZERO,
            debt_service: dec!(1000),
        };
        let out = income_and_safety(&input);
        let r = &out.result;
        assert_eq!(r.years.len(), 10);
        let y1 = &r.years[0];
        assert_eq!(y1.revenue, dec!(24000));
        assert_eq!(y1.total_expenses, dec!(18720));
        assert_eq!(y1.free_cash_flow, dec!(5280));
        // 5280 / 18720 = 28.2%
        assert!((y1.margin_pct - dec!(28.205)).abs() < dec!(0.001));
        assert_eq!(r.guidance, SafetyGuidance::SafeToDistribute);
    }

    #[test]
    fn test_income_and_safety_zero_expenses() {
        let input = IncomeSafetyInput {
            current_rent: dec!(2000),
            rent_growth_rate: dec!(3),
            opex: Decimal::ZERO,
            opex_inflation_rate: dec!(2),
            debt_service: Decimal::ZERO,
        };
        let out = income_and_safety(&input);
        assert_eq!(out.result.final_margin_pct, Decimal::ZERO);
        assert_eq!(out.result.guidance, SafetyGuidance::RetainCash);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_wealth_build_without_debt() {
        let input = WealthBuildInput {
            monthly_noi: dec!(1440),
            cap_rate: dec!(5.76),
            mortgages: vec![],
        };
        let out = wealth_build(&input).unwrap();
        let points = &out.result;
        assert_eq!(points.len(), 121);
        // 17280 / 0.0576 = 300000
        assert_eq!(points[0].property_value, dec!(300000));
        assert_eq!(points[0].equity, dec!(300000));
        // One year of 3% growth
        assert_eq!(points[12].property_value, dec!(309000));
    }

    #[test]
    fn test_wealth_build_with_loan_pays_down() {
        let input = WealthBuildInput {
            monthly_noi: dec!(1440),
            cap_rate: dec!(5.76),
            mortgages: vec![MortgageRecord {
                loan_name: None,
                principal: dec!(240000),
                interest_rate: dec!(6),
                term_months: 360,
                monthly_payment: dec!(1438.92),
                start_date: None,
            }],
        };
        let out = wealth_build(&input).unwrap();
        let points = &out.result;
        assert_eq!(points[0].loan_balance, dec!(240000));
        assert_eq!(points[0].equity, dec!(60000));
        assert!(points[120].loan_balance < points[60].loan_balance);
        assert!(points[120].equity > points[0].equity);
    }

    #[test]
    fn test_wealth_build_negative_equity_midpoint_rounds_up() {
        let input = WealthBuildInput {
            monthly_noi: Decimal::ZERO,
            cap_rate: Decimal::ZERO,
            mortgages: vec![MortgageRecord {
                loan_name: None,
                principal: dec!(2.5),
                interest_rate: Decimal::ZERO,
                term_months: 12,
                monthly_payment: Decimal::ZERO,
                start_date: None,
            }],
        };
        let out = wealth_build(&input).unwrap();
        let first = &out.result[0];
        assert_eq!(first.loan_balance, dec!(3));
        assert_eq!(first.equity, dec!(-2));
    }

    #[test]
    fn test_projections_beyond_decimal_range() {
        let points = rent_projection(Decimal::MAX / dec!(3), dec!(100), 2025);
        assert_eq!(points.len(), 2);

        let out = income_and_safety(&IncomeSafetyInput {
            current_rent: Decimal::MAX / dec!(10),
            rent_growth_rate: dec!(3),
            opex: dec!(560),
            opex_inflation_rate: dec!(2.5),
            debt_service: Decimal::ZERO,
        });
        assert!(out.result.years.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("year 1")));

        let err = wealth_build(&WealthBuildInput {
            monthly_noi: Decimal::MAX / dec!(10),
            cap_rate: dec!(5),
            mortgages: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, RentfolioError::InvalidInput { .. }));
    }

    #[test]
    fn test_wealth_build_zero_cap_rate() {
        let input = WealthBuildInput {
            monthly_noi: dec!(1000),
            cap_rate: Decimal::ZERO,
            mortgages: vec![],
        };
        let out = wealth_build(&input).unwrap();
        assert!(out.result.iter().all(|p| p.property_value.is_zero()));
        assert!(out.warnings.iter().any(|w| w.contains("Cap rate")));
    }
}
