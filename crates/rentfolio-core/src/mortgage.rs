//! Fixed-rate mortgage helpers: level payment, remaining balance, annual
//! debt service across a property's loans, and a yearly amortisation
//! summary for a single loan.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentfolioError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RentfolioResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const ONE_HUNDRED: Decimal = dec!(100);
/// Recorded vs. computed payment gap tolerated before warning.
const PAYMENT_TOLERANCE: Decimal = dec!(1);
/// Longest amortisation schedule accepted (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A mortgage row as stored for a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_name: Option<String>,
    /// Original loan amount
    pub principal: Money,
    /// Annual interest rate in percent (6.5 = 6.5%)
    pub interest_rate: Percent,
    /// Amortisation term in months
    pub term_months: u32,
    /// Monthly payment as recorded by the owner
    #[serde(default)]
    pub monthly_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Balance at the end of a loan year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearEndBalance {
    pub year: u32,
    pub balance: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
}

/// Amortisation summary for one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSummary {
    /// Level payment implied by principal, rate and term
    pub computed_payment: Money,
    /// Payment recorded on the mortgage row
    pub recorded_payment: Money,
    /// Recorded payment * 12
    pub annual_debt_service: Money,
    /// Interest over the full term at the computed payment
    pub total_interest: Money,
    pub year_end_balances: Vec<YearEndBalance>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment: P * r(1+r)^n / ((1+r)^n - 1), r = rate/100/12.
///
/// A zero rate amortises straight-line.
pub fn amortizing_payment(
    principal: Money,
    interest_rate: Percent,
    term_months: u32,
) -> RentfolioResult<Money> {
    if term_months == 0 {
        return Err(RentfolioError::InvalidInput {
            field: "term_months".into(),
            reason: "Mortgage term must be at least one month".into(),
        });
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(RentfolioError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Mortgage term cannot exceed {MAX_TERM_MONTHS} months"),
        });
    }

    let monthly_rate = monthly_rate(interest_rate);
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    // (1 + r)^n via iterative multiplication
    let growth = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..term_months {
        compound = match compound.checked_mul(growth) {
            Some(c) => c,
            None => return Err(out_of_range("interest_rate")),
        };
    }

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(RentfolioError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    principal
        .checked_mul(monthly_rate)
        .and_then(|p| p.checked_mul(compound))
        .and_then(|p| p.checked_div(denominator))
        .ok_or_else(|| out_of_range("principal"))
}

/// Outstanding balance after `months_paid` level payments, never below zero.
pub fn balance_after(
    principal: Money,
    interest_rate: Percent,
    term_months: u32,
    months_paid: u32,
) -> RentfolioResult<Money> {
    if months_paid >= term_months {
        return Ok(Decimal::ZERO);
    }

    let payment = amortizing_payment(principal, interest_rate, term_months)?;
    let monthly_rate = monthly_rate(interest_rate);

    let mut balance = principal;
    for _ in 0..months_paid {
        let interest = balance
            .checked_mul(monthly_rate)
            .ok_or_else(|| out_of_range("principal"))?;
        balance -= payment - interest;
    }

    Ok(balance.max(Decimal::ZERO))
}

/// Annual debt service across a property's loans, from recorded payments.
/// A total too large for `Decimal` is reported as 0.
pub fn annual_debt_service(mortgages: &[MortgageRecord]) -> Money {
    mortgages
        .iter()
        .map(|m| m.monthly_payment.max(Decimal::ZERO))
        .try_fold(Decimal::ZERO, |acc, payment| acc.checked_add(payment))
        .and_then(|monthly| monthly.checked_mul(MONTHS_PER_YEAR))
        .unwrap_or(Decimal::ZERO)
}

/// Yearly amortisation summary for one loan, with a warning when the
/// recorded payment disagrees with the payment the loan terms imply.
pub fn amortization_summary(
    record: &MortgageRecord,
) -> RentfolioResult<ComputationOutput<AmortizationSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if record.principal < Decimal::ZERO {
        return Err(RentfolioError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if record.interest_rate < Decimal::ZERO {
        return Err(RentfolioError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    let computed_payment = amortizing_payment(record.principal, record.interest_rate, record.term_months)?;
    let monthly_rate = monthly_rate(record.interest_rate);

    let mut balance = record.principal;
    let mut total_interest = Decimal::ZERO;
    let mut year_end_balances = Vec::new();
    let mut year_interest = Decimal::ZERO;
    let mut year_principal = Decimal::ZERO;

    for month in 1..=record.term_months {
        let interest = balance
            .checked_mul(monthly_rate)
            .ok_or_else(|| out_of_range("principal"))?;
        let principal_paid = (computed_payment - interest).min(balance);
        balance -= principal_paid;
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| out_of_range("principal"))?;
        year_interest += interest;
        year_principal += principal_paid;

        if month % 12 == 0 || month == record.term_months {
            year_end_balances.push(YearEndBalance {
                year: month.div_ceil(12),
                balance: balance.max(Decimal::ZERO),
                interest_paid: year_interest,
                principal_paid: year_principal,
            });
            year_interest = Decimal::ZERO;
            year_principal = Decimal::ZERO;
        }
    }

    let recorded_payment = record.monthly_payment;
    if recorded_payment.is_zero() {
        warnings.push("No monthly payment recorded — annual debt service is 0".into());
    } else if recorded_payment
        .checked_sub(computed_payment)
        .map_or(true, |gap| gap.abs() > PAYMENT_TOLERANCE)
    {
        warnings.push(format!(
            "Recorded payment {recorded_payment} differs from computed payment {:.2} — \
             the difference may be escrow or an outdated row",
            computed_payment
        ));
    }

    let output = AmortizationSummary {
        computed_payment,
        recorded_payment,
        annual_debt_service: annual_debt_service(std::slice::from_ref(record)),
        total_interest,
        year_end_balances,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fixed-Rate Mortgage Amortisation",
        record,
        warnings,
        elapsed,
        output,
    ))
}

fn monthly_rate(interest_rate: Percent) -> Decimal {
    interest_rate / ONE_HUNDRED / MONTHS_PER_YEAR
}

fn out_of_range(field: &str) -> RentfolioError {
    RentfolioError::InvalidInput {
        field: field.into(),
        reason: "Loan terms produce amounts beyond the supported decimal range".into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
