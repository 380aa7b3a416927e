//! Operating-expense normalisation for a single rental property.
//!
//! Property rows carry their recurring costs in two shapes: the legacy
//! scalar columns (`property_taxes`, `insurance` plus an "in mortgage" flag
//! for each) and the newer [`PeriodAmount`] records that know their billing
//! period and provenance. This module adapts both shapes into one monthly
//! OPEX figure and makes sure a cost that is already paid through mortgage
//! escrow is never counted a second time.
//!
//! Every function here is total: missing or malformed data degrades to
//! zero (or "excluded") instead of producing an error.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{lenient, Money, Percent};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);
const ONE_HUNDRED: Decimal = dec!(100);

/// Annual property tax assumed by the dashboard when only a sale price is known.
pub const AUTO_TAX_RATE: Decimal = dec!(0.013);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Billing period of a recurring cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Monthly,
    Annual,
}

/// Where a recurring cost figure came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Entered by the owner from a bill or statement
    Direct,
    /// Placeholder or rule-of-thumb value
    Estimated,
    /// Collected and paid by the mortgage servicer (escrow)
    InMortgage,
    #[default]
    Unknown,
}

/// One recurring cost line with its period and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAmount {
    /// Dollar value in the stated period
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    pub amount: Money,
    /// Anything other than "annual" is billed monthly
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub period: Period,
    /// An unrecognised provenance counts as unknown, which stays in OPEX
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub source: Source,
}

impl PeriodAmount {
    pub fn new(amount: Money, period: Period, source: Source) -> Self {
        Self {
            amount,
            period,
            source,
        }
    }

    pub fn monthly(amount: Money, source: Source) -> Self {
        Self::new(amount, Period::Monthly, source)
    }

    pub fn annual(amount: Money, source: Source) -> Self {
        Self::new(amount, Period::Annual, source)
    }

    /// Zero-amount marker for a cost that lives inside the mortgage payment.
    fn escrowed() -> Self {
        Self::monthly(Decimal::ZERO, Source::InMortgage)
    }
}

/// Read-only view of the property fields that drive OPEX.
///
/// When a normalised field (`taxes`, `hazard_insurance`) is present it wins
/// over the legacy scalar columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyLike {
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Money>,
    /// Management fee as percent of rent
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mgmt_pct: Option<Percent>,
    /// Maintenance allowance as percent of rent
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_pct: Option<Percent>,

    // Legacy columns
    /// Monthly property tax
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_taxes: Option<Money>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub taxes_in_mortgage: bool,
    /// Monthly hazard insurance premium
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Money>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub insurance_in_mortgage: bool,

    // Normalised shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<PeriodAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_insurance: Option<PeriodAmount>,
}

/// Per-calculation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpexContext {
    /// Rent basis for the percentage-of-rent lines
    #[serde(default, alias = "monthlyRent", deserialize_with = "lenient::decimal_or_zero")]
    pub monthly_rent: Money,
    /// True when tax and insurance are bundled into the mortgage payment
    #[serde(default, alias = "mortgageIncludesEscrow", deserialize_with = "lenient::flag")]
    pub mortgage_includes_escrow: bool,
}

impl OpexContext {
    pub fn new(monthly_rent: Money) -> Self {
        Self {
            monthly_rent,
            mortgage_includes_escrow: false,
        }
    }

    pub fn with_escrow(mut self, mortgage_includes_escrow: bool) -> Self {
        self.mortgage_includes_escrow = mortgage_includes_escrow;
        self
    }
}

/// Monthly OPEX split into its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpexBreakdown {
    /// Property tax counted this month (0 when escrowed or excluded)
    pub taxes: Money,
    /// Hazard insurance counted this month (0 when escrowed or excluded)
    pub insurance: Money,
    /// Management fee at `mgmt_pct` of rent
    pub management: Money,
    /// Maintenance allowance at `maintenance_pct` of rent
    pub maintenance: Money,
    /// Sum of the lines rounded to whole dollars
    pub total: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Convert a cost line to monthly dollars, never below zero.
///
/// Absent lines are worth nothing. Annual amounts are divided by 12.
pub fn to_monthly(pa: Option<&PeriodAmount>) -> Money {
    let Some(pa) = pa else {
        return Decimal::ZERO;
    };
    let base = match pa.period {
        Period::Annual => pa.amount / MONTHS_PER_YEAR,
        Period::Monthly => pa.amount,
    };
    base.max(Decimal::ZERO)
}

/// Whether a cost line belongs in separately tracked OPEX.
///
/// A cost is attributed to exactly one of {OPEX line, mortgage escrow}.
/// `in_mortgage` lines are always excluded; when the mortgage bundles escrow,
/// direct and estimated figures are superseded by it as well.
pub fn include(pa: Option<&PeriodAmount>, ctx: &OpexContext) -> bool {
    match pa.map(|p| p.source) {
        None => false,
        Some(Source::InMortgage) => false,
        Some(Source::Direct | Source::Estimated) if ctx.mortgage_includes_escrow => false,
        Some(_) => true,
    }
}

/// Normalised tax line for a property.
///
/// Precedence: `taxes` record, then the `taxes_in_mortgage` flag, then the
/// scalar `property_taxes` column (monthly). A missing scalar yields an
/// `estimated` zero.
pub fn legacy_taxes(p: &PropertyLike) -> Option<PeriodAmount> {
    match (&p.taxes, p.taxes_in_mortgage, p.property_taxes) {
        (Some(normalised), _, _) => Some(normalised.clone()),
        (None, true, _) => Some(PeriodAmount::escrowed()),
        (None, false, Some(amount)) => Some(PeriodAmount::monthly(amount, Source::Direct)),
        (None, false, None) => Some(PeriodAmount::monthly(Decimal::ZERO, Source::Estimated)),
    }
}

/// Normalised hazard-insurance line for a property.
///
/// Same precedence as [`legacy_taxes`], except a missing scalar is tagged
/// `unknown` rather than `estimated`.
pub fn legacy_insurance(p: &PropertyLike) -> Option<PeriodAmount> {
    match (&p.hazard_insurance, p.insurance_in_mortgage, p.insurance) {
        (Some(normalised), _, _) => Some(normalised.clone()),
        (None, true, _) => Some(PeriodAmount::escrowed()),
        (None, false, Some(amount)) => Some(PeriodAmount::monthly(amount, Source::Direct)),
        (None, false, None) => Some(PeriodAmount::monthly(Decimal::ZERO, Source::Unknown)),
    }
}

/// Monthly OPEX line by line.
pub fn opex_breakdown(p: &PropertyLike, ctx: &OpexContext) -> OpexBreakdown {
    let taxes_pa = legacy_taxes(p);
    let ins_pa = legacy_insurance(p);

    let taxes = counted(taxes_pa.as_ref(), ctx);
    let insurance = counted(ins_pa.as_ref(), ctx);

    let management = pct_of_rent(p.mgmt_pct, ctx.monthly_rent);
    let maintenance = pct_of_rent(p.maintenance_pct, ctx.monthly_rent);

    let total = [taxes, insurance, management, maintenance]
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(*line))
        .map(round_dollars)
        .unwrap_or(Decimal::ZERO);

    OpexBreakdown {
        taxes,
        insurance,
        management,
        maintenance,
        total,
    }
}

/// Monthly OPEX for a property in whole dollars.
///
/// Taxes + insurance (after the inclusion rules) + management and
/// maintenance as percentages of `ctx.monthly_rent`. Intermediate math keeps
/// full precision; only the result is rounded.
pub fn monthly_for_property(p: &PropertyLike, ctx: &OpexContext) -> Money {
    opex_breakdown(p, ctx).total
}

/// Auto-estimated property tax: 1.3% of the sale price, rounded to dollars.
pub fn estimate_property_taxes(sale_price: Option<Money>) -> Option<Money> {
    sale_price
        .filter(|price| *price > Decimal::ZERO)
        .map(|price| round_dollars(price * AUTO_TAX_RATE))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn counted(pa: Option<&PeriodAmount>, ctx: &OpexContext) -> Money {
    if include(pa, ctx) {
        to_monthly(pa)
    } else {
        Decimal::ZERO
    }
}

/// Overflow counts as 0, like any other unusable figure.
fn pct_of_rent(pct: Option<Percent>, monthly_rent: Money) -> Money {
    let rate = pct.unwrap_or(Decimal::ZERO) / ONE_HUNDRED;
    match rate.checked_mul(monthly_rent) {
        Some(amount) => amount.max(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

/// Round to whole dollars with halves going toward positive infinity, so
/// -2.5 becomes -2 and 2.5 becomes 3.
pub(crate) fn round_dollars(value: Money) -> Money {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    value.round_dp_with_strategy(0, strategy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
