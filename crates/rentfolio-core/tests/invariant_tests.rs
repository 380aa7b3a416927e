//! Property-based checks of the OPEX and metrics invariants.
//!
//! Every calculator is total and stateless, so these hold for arbitrary
//! amounts, percentages, periods and provenance tags, including negative
//! and zero values.

use proptest::prelude::*;
use rentfolio_core::metrics;
use rentfolio_core::opex::{self, OpexContext, Period, PeriodAmount, PropertyLike, Source};
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

/// Dollar amounts with cents, including negatives.
fn arb_money() -> impl Strategy<Value = Decimal> {
    (-5_000_000i64..5_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Percent-of-rent values with one decimal place.
fn arb_pct() -> impl Strategy<Value = Decimal> {
    (-200i64..400).prop_map(|tenths| Decimal::new(tenths, 1))
}

fn arb_period() -> impl Strategy<Value = Period> {
    prop_oneof![Just(Period::Monthly), Just(Period::Annual)]
}

fn arb_source() -> impl Strategy<Value = Source> {
    prop_oneof![
        Just(Source::Direct),
        Just(Source::Estimated),
        Just(Source::InMortgage),
        Just(Source::Unknown),
    ]
}

fn arb_period_amount() -> impl Strategy<Value = PeriodAmount> {
    (arb_money(), arb_period(), arb_source())
        .prop_map(|(amount, period, source)| PeriodAmount::new(amount, period, source))
}

fn arb_property() -> impl Strategy<Value = PropertyLike> {
    (
        proptest::option::of(arb_pct()),
        proptest::option::of(arb_pct()),
        proptest::option::of(arb_money()),
        any::<bool>(),
        proptest::option::of(arb_money()),
        any::<bool>(),
        proptest::option::of(arb_period_amount()),
        proptest::option::of(arb_period_amount()),
    )
        .prop_map(
            |(mgmt, maint, taxes_scalar, taxes_flag, ins_scalar, ins_flag, taxes, ins)| {
                PropertyLike {
                    sale_price: None,
                    mgmt_pct: mgmt,
                    maintenance_pct: maint,
                    property_taxes: taxes_scalar,
                    taxes_in_mortgage: taxes_flag,
                    insurance: ins_scalar,
                    insurance_in_mortgage: ins_flag,
                    taxes,
                    hazard_insurance: ins,
                }
            },
        )
}

/// Any representable decimal, up to `Decimal::MAX` in magnitude.
fn arb_full_range() -> impl Strategy<Value = Decimal> {
    (any::<u32>(), any::<u32>(), any::<u32>(), any::<bool>(), 0u32..=28)
        .prop_map(|(lo, mid, hi, negative, scale)| Decimal::from_parts(lo, mid, hi, negative, scale))
}

fn arb_context() -> impl Strategy<Value = OpexContext> {
    (arb_money(), any::<bool>())
        .prop_map(|(rent, escrow)| OpexContext::new(rent).with_escrow(escrow))
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// to_monthly never goes negative, whatever the sign of the amount.
    #[test]
    fn prop_to_monthly_non_negative(pa in arb_period_amount()) {
        prop_assert!(opex::to_monthly(Some(&pa)) >= Decimal::ZERO);
    }

    /// Monthly OPEX is always a non-negative whole number.
    #[test]
    fn prop_monthly_opex_is_non_negative_integer(p in arb_property(), ctx in arb_context()) {
        let total = opex::monthly_for_property(&p, &ctx);
        prop_assert!(total >= Decimal::ZERO);
        prop_assert_eq!(total, total.trunc());
    }

    /// An in_mortgage line is excluded with or without the escrow flag.
    #[test]
    fn prop_in_mortgage_always_excluded(
        amount in arb_money(),
        period in arb_period(),
        ctx in arb_context(),
    ) {
        let pa = PeriodAmount::new(amount, period, Source::InMortgage);
        prop_assert!(!opex::include(Some(&pa), &ctx));
    }

    /// Ratio metrics return exactly zero for non-positive denominators.
    #[test]
    fn prop_zero_denominators_yield_zero(
        numerator in arb_money(),
        denominator in (-5_000_000i64..=0).prop_map(|c| Decimal::new(c, 2)),
    ) {
        prop_assert_eq!(metrics::cap_rate(numerator, denominator), Decimal::ZERO);
        prop_assert_eq!(metrics::roi_annual(numerator, denominator), Decimal::ZERO);
        prop_assert_eq!(metrics::cash_on_cash(numerator, denominator), Decimal::ZERO);
        prop_assert_eq!(metrics::dcr(numerator, denominator), Decimal::ZERO);
    }

    /// NOI is exactly twelve months of rent less OPEX.
    #[test]
    fn prop_noi_identity(rent in arb_money(), p in arb_property(), ctx in arb_context()) {
        let opex = opex::monthly_for_property(&p, &ctx);
        prop_assert_eq!(
            metrics::noi_annual(rent, &p, &ctx),
            (rent - opex) * Decimal::from(12)
        );
    }

    /// Turning escrow on removes exactly the direct/estimated tax and
    /// insurance lines and nothing else.
    #[test]
    fn prop_escrow_removes_only_superseded_lines(p in arb_property(), rent in arb_money()) {
        let plain = OpexContext::new(rent);
        let escrow = OpexContext::new(rent).with_escrow(true);

        let before = opex::opex_breakdown(&p, &plain);
        let after = opex::opex_breakdown(&p, &escrow);

        let superseded = |pa: Option<PeriodAmount>| {
            matches!(
                pa.map(|x| x.source),
                Some(Source::Direct | Source::Estimated)
            )
        };

        if superseded(opex::legacy_taxes(&p)) {
            prop_assert_eq!(after.taxes, Decimal::ZERO);
            prop_assert_eq!(before.taxes, opex::to_monthly(opex::legacy_taxes(&p).as_ref()));
        } else {
            prop_assert_eq!(after.taxes, before.taxes);
        }
        if superseded(opex::legacy_insurance(&p)) {
            prop_assert_eq!(after.insurance, Decimal::ZERO);
            prop_assert_eq!(before.insurance, opex::to_monthly(opex::legacy_insurance(&p).as_ref()));
        } else {
            prop_assert_eq!(after.insurance, before.insurance);
        }
        prop_assert_eq!(before.management, after.management);
        prop_assert_eq!(before.maintenance, after.maintenance);
    }

    /// Same inputs, same outputs.
    #[test]
    fn prop_calculators_are_idempotent(
        p in arb_property(),
        ctx in arb_context(),
        value in arb_money(),
        equity in arb_money(),
    ) {
        prop_assert_eq!(
            opex::monthly_for_property(&p, &ctx),
            opex::monthly_for_property(&p, &ctx)
        );
        let noi = metrics::noi_annual(ctx.monthly_rent, &p, &ctx);
        prop_assert_eq!(
            metrics::irr_10_year(value, noi, equity),
            metrics::irr_10_year(value, noi, equity)
        );
    }

    /// Calculators stay total over the whole decimal range.
    #[test]
    fn prop_calculators_total_over_full_range(
        rent in arb_full_range(),
        mgmt in arb_full_range(),
        taxes in arb_full_range(),
        value in arb_full_range(),
        debt in arb_full_range(),
        equity in arb_full_range(),
    ) {
        let p = PropertyLike {
            mgmt_pct: Some(mgmt),
            property_taxes: Some(taxes),
            ..Default::default()
        };
        let ctx = OpexContext::new(rent);
        let opex = opex::monthly_for_property(&p, &ctx);
        prop_assert!(opex >= Decimal::ZERO);

        let noi = metrics::noi_annual(rent, &p, &ctx);
        let _ = metrics::cap_rate(noi, value);
        let _ = metrics::roi_annual(noi, value);
        let _ = metrics::cash_on_cash(noi, equity);
        let _ = metrics::dcr(noi, debt);
        let _ = metrics::irr_10_year(value, noi, equity);
    }
}
