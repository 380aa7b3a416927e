//! Income-property KPIs: NOI, cap rate, DCR, ROI, cash-on-cash and a
//! closed-form 10-year IRR approximation.
//!
//! All calculators are pure and total. Every denominator is guarded and
//! yields 0 instead of dividing, a result too large for `Decimal` yields 0,
//! and absent optional inputs count as 0.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::opex::{self, OpexBreakdown, OpexContext, PropertyLike, Source};
use crate::types::{lenient, with_metadata, ComputationOutput, Money, Percent};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);
const ONE_HUNDRED: Decimal = dec!(100);

/// Fixed annual appreciation assumed by the IRR approximation.
pub const IRR_APPRECIATION: Decimal = dec!(1.03);
/// Holding period of the IRR approximation, in years.
pub const IRR_HORIZON_YEARS: u64 = 10;
/// Debt coverage below this is flagged as unhealthy.
pub const HEALTHY_DCR: Decimal = dec!(1.25);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Inputs for [`summary`] and [`analyze_property`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsParams {
    /// Rent actually collected per month (vacancy-adjusted by the caller)
    #[serde(default, alias = "monthlyRent", deserialize_with = "lenient::decimal_or_zero")]
    pub monthly_rent: Money,
    #[serde(default)]
    pub property: PropertyLike,
    #[serde(default, alias = "ctx")]
    pub context: OpexContext,
    #[serde(default, alias = "propertyValue", deserialize_with = "lenient::decimal_or_zero")]
    pub property_value: Money,
    #[serde(default, alias = "debtServiceAnnual", deserialize_with = "lenient::decimal")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_service_annual: Option<Money>,
    #[serde(default, alias = "investedEquity", deserialize_with = "lenient::decimal")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invested_equity: Option<Money>,
}

/// The five headline KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Annual net operating income
    pub noi: Money,
    /// Cap rate, percent
    pub cap: Percent,
    /// Debt coverage ratio
    pub dcr: Decimal,
    /// Annual ROI on property value, percent (computed on NOI)
    pub roi: Percent,
    /// Cash-on-cash return, percent (computed on NOI)
    pub coc: Percent,
}

/// Full property report produced by [`analyze_property`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysis {
    /// Monthly OPEX by line
    pub opex: OpexBreakdown,
    /// Headline KPIs, wired exactly as the dashboard cards expect
    pub summary: MetricsSummary,
    /// 10-year IRR approximation on NOI, percent
    pub irr_10_year: Percent,
    /// Annual debt service used for DCR
    pub debt_service_annual: Money,
    /// NOI less debt service
    pub cash_flow_after_debt: Money,
    /// Cash-on-cash computed on cash flow after debt, percent
    pub cash_on_cash_after_debt: Percent,
    /// Whether DCR clears the 1.25 threshold (false when there is no debt)
    pub dcr_healthy: bool,
    /// Informational 1.3%-of-price tax figure when taxes are not recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_property_taxes: Option<Money>,
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

/// Annual NOI: `(monthly_rent - monthly OPEX) * 12`, or 0 if that
/// overflows.
pub fn noi_annual(monthly_rent: Money, property: &PropertyLike, ctx: &OpexContext) -> Money {
    let opex_monthly = opex::monthly_for_property(property, ctx);
    monthly_rent
        .checked_sub(opex_monthly)
        .and_then(|net| net.checked_mul(MONTHS_PER_YEAR))
        .unwrap_or(Decimal::ZERO)
}

/// Cap rate = NOI / property value, as a percent.
pub fn cap_rate(noi_annual: Money, property_value: Money) -> Percent {
    pct_of(noi_annual, property_value)
}

/// Annual ROI = annual cash flow / property value, as a percent.
pub fn roi_annual(cash_flow_annual: Money, property_value: Money) -> Percent {
    pct_of(cash_flow_annual, property_value)
}

/// Debt coverage ratio = NOI / annual debt service.
pub fn dcr(noi_annual: Money, debt_service_annual: Money) -> Decimal {
    if debt_service_annual > Decimal::ZERO {
        noi_annual
            .checked_div(debt_service_annual)
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Cash-on-cash = annual cash flow / invested equity, as a percent.
pub fn cash_on_cash(cash_flow_annual: Money, invested_equity: Money) -> Percent {
    pct_of(cash_flow_annual, invested_equity)
}

/// Closed-form 10-year IRR approximation, as a percent.
///
/// Not a cash-flow solver: the property appreciates 3%/yr, the current
/// annual cash flow repeats for 10 years with no growth, and the total is
/// annualised against equity floored at 1:
/// `(((value * 1.03^10 + cf * 10) / max(equity, 1))^(1/10) - 1) * 100`.
///
/// A non-positive terminal multiple is a total loss and returns -100. A
/// multiple too large to represent returns 0.
pub fn irr_10_year(property_value: Money, cash_flow_annual: Money, invested_equity: Money) -> Percent {
    let horizon = Decimal::from(IRR_HORIZON_YEARS);
    let base = invested_equity.max(Decimal::ONE);

    let multiple = property_value
        .checked_mul(IRR_APPRECIATION.powu(IRR_HORIZON_YEARS))
        .zip(cash_flow_annual.checked_mul(horizon))
        .and_then(|(future_value, total_cf)| future_value.checked_add(total_cf))
        .and_then(|terminal| terminal.checked_div(base));
    let multiple = match multiple {
        Some(m) => m,
        None => return Decimal::ZERO,
    };
    if multiple <= Decimal::ZERO {
        return -ONE_HUNDRED;
    }

    multiple
        .checked_powd(Decimal::ONE / horizon)
        .map(|annualised| (annualised - Decimal::ONE) * ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// Headline KPIs for one property.
///
/// ROI and cash-on-cash are fed NOI, not cash flow after debt service; the
/// dashboard cards rely on this wiring. [`analyze_property`] reports the
/// post-debt figures separately.
pub fn summary(params: &MetricsParams) -> MetricsSummary {
    let noi = noi_annual(params.monthly_rent, &params.property, &params.context);
    let cap = cap_rate(noi, params.property_value);
    let dcr = dcr(noi, params.debt_service_annual.unwrap_or(Decimal::ZERO));
    let roi = roi_annual(noi, params.property_value);
    let coc = cash_on_cash(noi, params.invested_equity.unwrap_or(Decimal::ZERO));
    MetricsSummary {
        noi,
        cap,
        dcr,
        roi,
        coc,
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Full property report: OPEX lines, KPIs, IRR approximation and post-debt
/// cash flow, with warnings for figures a reviewer should look at.
pub fn analyze_property(params: &MetricsParams) -> ComputationOutput<PropertyAnalysis> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let opex = opex::opex_breakdown(&params.property, &params.context);
    let summary = summary(params);

    let debt_service_annual = params.debt_service_annual.unwrap_or(Decimal::ZERO);
    let invested_equity = params.invested_equity.unwrap_or(Decimal::ZERO);

    let irr_10_year = irr_10_year(params.property_value, summary.noi, invested_equity);
    let cash_flow_after_debt = summary
        .noi
        .checked_sub(debt_service_annual)
        .unwrap_or(Decimal::ZERO);
    let cash_on_cash_after_debt = cash_on_cash(cash_flow_after_debt, invested_equity);
    let dcr_healthy = debt_service_annual > Decimal::ZERO && summary.dcr >= HEALTHY_DCR;

    let estimated_property_taxes = if params.property.taxes.is_none()
        && !params.property.taxes_in_mortgage
        && params.property.property_taxes.is_none()
    {
        opex::estimate_property_taxes(params.property.sale_price)
    } else {
        None
    };

    collect_warnings(
        params,
        &summary,
        debt_service_annual,
        invested_equity,
        estimated_property_taxes,
        &mut warnings,
    );

    tracing::debug!(
        noi = %summary.noi,
        opex_monthly = %opex.total,
        warnings = warnings.len(),
        "property analysis complete"
    );

    let output = PropertyAnalysis {
        opex,
        summary,
        irr_10_year,
        debt_service_annual,
        cash_flow_after_debt,
        cash_on_cash_after_debt,
        dcr_healthy,
        estimated_property_taxes,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Rental Property Metrics (NOI, Cap Rate, DCR, ROI, CoC, 10y IRR approximation)",
        params,
        warnings,
        elapsed,
        output,
    )
}

fn collect_warnings(
    params: &MetricsParams,
    summary: &MetricsSummary,
    debt_service_annual: Money,
    invested_equity: Money,
    estimated_property_taxes: Option<Money>,
    warnings: &mut Vec<String>,
) {
    if summary.noi < Decimal::ZERO {
        warnings.push(format!(
            "NOI of {} is negative — operating expenses exceed collected rent",
            summary.noi
        ));
    }

    if params.property_value <= Decimal::ZERO {
        warnings.push("Property value not provided — cap rate and ROI reported as 0".into());
    }

    if debt_service_annual > Decimal::ZERO {
        if summary.dcr < HEALTHY_DCR {
            warnings.push(format!(
                "DCR of {:.2} is below {HEALTHY_DCR}x — debt service coverage is thin",
                summary.dcr
            ));
        }
        warnings.push(
            "ROI and cash-on-cash are computed on NOI before debt service; \
             see cash_on_cash_after_debt for the levered figure"
                .into(),
        );
    }

    if invested_equity <= Decimal::ZERO {
        warnings.push(
            "Invested equity not provided — cash-on-cash reported as 0 and IRR uses a base of 1"
                .into(),
        );
    }

    if params.context.mortgage_includes_escrow {
        let escrowed: Vec<&str> = [
            ("taxes", opex::legacy_taxes(&params.property)),
            ("insurance", opex::legacy_insurance(&params.property)),
        ]
        .iter()
        .filter(|(_, pa)| {
            matches!(
                pa.as_ref().map(|p| p.source),
                Some(Source::Direct | Source::Estimated)
            )
        })
        .map(|(name, _)| *name)
        .collect();
        if !escrowed.is_empty() {
            warnings.push(format!(
                "Mortgage includes escrow — {} excluded from OPEX",
                escrowed.join(" and ")
            ));
        }
    }

    if let Some(estimate) = estimated_property_taxes {
        warnings.push(format!(
            "Property taxes not recorded — 1.3% of sale price would be {estimate} per year"
        ));
    }
}

fn pct_of(numerator: Money, denominator: Money) -> Percent {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match numerator.checked_div(denominator) {
        Some(ratio) => ratio.checked_mul(ONE_HUNDRED).unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
