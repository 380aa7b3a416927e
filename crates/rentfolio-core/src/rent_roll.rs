//! Rent roll and dashboard cash position.
//!
//! Rolls a property's leases, this month's rent payments and recorded
//! expenses into the headline dashboard figures (MRR, ARR, collected vs.
//! expected, occupancy, net cash flow) and tags each lease as paid, overdue
//! or expiring.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::RentfolioError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::RentfolioResult;

/// A lease ending within this many days is flagged as expiring.
pub const EXPIRY_WINDOW_DAYS: i64 = 60;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Lease status as stored on the lease row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Active,
    Expiring,
    Expired,
    Vacant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Overdue,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Repairs,
    Pm,
    Tax,
    Insurance,
    Capex,
    Utilities,
    Hoa,
    Advertising,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub due_date: NaiveDate,
    pub amount_due: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub monthly_rent: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit: Option<Money>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeaseStatus>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub amount: Money,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentRollInput {
    /// Date the roll is taken; selects the payment month
    pub as_of: NaiveDate,
    pub leases: Vec<LeaseRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    /// Monthly mortgage payment deducted from net cash flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mortgage_payment: Option<Money>,
    /// Rentable units; defaults to the number of leases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_units: Option<u32>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Collection status shown on the rent roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Paid,
    Overdue,
    Expiring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseSnapshot {
    pub id: String,
    pub tenant: String,
    pub unit: String,
    pub monthly_rent: Money,
    pub status: CollectionStatus,
    pub start_date: NaiveDate,
    pub lease_end: NaiveDate,
    pub days_until_end: i64,
    pub days_overdue: i64,
    pub deposit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Rent received this month
    pub collected: Money,
    /// Rent due this month
    pub expected: Money,
    pub occupied_units: u32,
    pub total_units: u32,
    /// "occupied/total"
    pub occupancy: String,
    /// Monthly recurring revenue
    pub mrr: Money,
    /// Annual recurring revenue (12 * MRR)
    pub arr: Money,
    pub total_expenses: Money,
    pub expenses_by_category: BTreeMap<ExpenseCategory, Money>,
    /// collected - expenses - mortgage payment
    pub net_cash_flow: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentRoll {
    pub leases: Vec<LeaseSnapshot>,
    pub metrics: DashboardMetrics,
}

/// Rent roll filter chips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseFilter {
    #[default]
    All,
    Paid,
    Overdue,
    Expiring,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the rent roll and dashboard metrics as of `input.as_of`.
pub fn build_rent_roll(input: &RentRollInput) -> RentfolioResult<ComputationOutput<RentRoll>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_leases(&input.leases)?;

    let mut mrr = Decimal::ZERO;
    let mut collected = Decimal::ZERO;
    let mut occupied_units: u32 = 0;
    let mut leases = Vec::with_capacity(input.leases.len());

    for lease in &input.leases {
        mrr = add_money(mrr, lease.monthly_rent, "leases")?;

        let days_until_end = (lease.end_date - input.as_of).num_days();
        let current = current_payment(lease, input.as_of);

        let mut status = CollectionStatus::Paid;
        let mut days_overdue = 0;

        if let Some(payment) = current {
            match payment.status {
                Some(PaymentStatus::Paid) => {
                    let paid = payment.paid_amount.unwrap_or(Decimal::ZERO);
                    collected = add_money(collected, paid, "payments")?;
                }
                Some(PaymentStatus::Overdue) => {
                    status = CollectionStatus::Overdue;
                    days_overdue = (input.as_of - payment.due_date).num_days();
                }
                Some(PaymentStatus::Pending) | None => {}
            }
        }

        if days_until_end > 0 && days_until_end <= EXPIRY_WINDOW_DAYS {
            status = CollectionStatus::Expiring;
        }

        if matches!(lease.status, Some(LeaseStatus::Active | LeaseStatus::Expiring)) {
            occupied_units += 1;
        }

        if days_until_end <= 0 && matches!(lease.status, Some(LeaseStatus::Active)) {
            warnings.push(format!(
                "Lease {} ended on {} but is still marked active",
                lease.id, lease.end_date
            ));
        }

        leases.push(LeaseSnapshot {
            id: lease.id.clone(),
            tenant: lease.tenant.clone().unwrap_or_else(|| "Unknown".into()),
            unit: lease.unit.clone().unwrap_or_else(|| "Unknown".into()),
            monthly_rent: lease.monthly_rent,
            status,
            start_date: lease.start_date,
            lease_end: lease.end_date,
            days_until_end,
            days_overdue,
            deposit: lease.deposit.unwrap_or(Decimal::ZERO),
        });
    }

    let mut expenses_by_category: BTreeMap<ExpenseCategory, Money> = BTreeMap::new();
    let mut total_expenses = Decimal::ZERO;
    for expense in &input.expenses {
        let entry = expenses_by_category.entry(expense.category).or_default();
        *entry = add_money(*entry, expense.amount, "expenses")?;
        total_expenses = add_money(total_expenses, expense.amount, "expenses")?;
    }

    let mortgage_payment = input.mortgage_payment.unwrap_or(Decimal::ZERO);
    let total_units = input.total_units.unwrap_or(input.leases.len() as u32);
    let net_cash_flow = collected
        .checked_sub(total_expenses)
        .and_then(|net| net.checked_sub(mortgage_payment))
        .ok_or_else(|| out_of_range("mortgage_payment"))?;
    let arr = mrr
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| out_of_range("leases"))?;

    let overdue = leases
        .iter()
        .filter(|l| l.status == CollectionStatus::Overdue)
        .count();
    if overdue > 0 {
        warnings.push(format!("{overdue} lease(s) overdue this month"));
    }
    if occupied_units > total_units {
        warnings.push(format!(
            "{occupied_units} occupied leases exceed {total_units} total units"
        ));
    }
    if net_cash_flow < Decimal::ZERO {
        warnings.push(format!("Net cash flow of {net_cash_flow} is negative"));
    }

    tracing::debug!(
        leases = leases.len(),
        %mrr,
        %collected,
        %net_cash_flow,
        "rent roll built"
    );

    let metrics = DashboardMetrics {
        collected,
        expected: mrr,
        occupied_units,
        total_units,
        occupancy: format!("{occupied_units}/{total_units}"),
        mrr,
        arr,
        total_expenses,
        expenses_by_category,
        net_cash_flow,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Rent Roll and Monthly Cash Position",
        input,
        warnings,
        elapsed,
        RentRoll { leases, metrics },
    ))
}

fn add_money(total: Money, amount: Money, field: &str) -> RentfolioResult<Money> {
    total.checked_add(amount).ok_or_else(|| out_of_range(field))
}

fn out_of_range(field: &str) -> RentfolioError {
    RentfolioError::InvalidInput {
        field: field.into(),
        reason: "Totals exceed the supported decimal range".into(),
    }
}

/// Leases matching a rent roll filter chip.
pub fn filter_leases(leases: &[LeaseSnapshot], filter: LeaseFilter) -> Vec<&LeaseSnapshot> {
    leases
        .iter()
        .filter(|l| match filter {
            LeaseFilter::All => true,
            LeaseFilter::Paid => l.status == CollectionStatus::Paid,
            LeaseFilter::Overdue => l.status == CollectionStatus::Overdue,
            LeaseFilter::Expiring => l.status == CollectionStatus::Expiring,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_leases(leases: &[LeaseRecord]) -> RentfolioResult<()> {
    for lease in leases {
        if lease.end_date < lease.start_date {
            return Err(RentfolioError::DateError(format!(
                "Lease {} ends ({}) before it starts ({})",
                lease.id, lease.end_date, lease.start_date
            )));
        }
        if lease.monthly_rent < Decimal::ZERO {
            return Err(RentfolioError::InvalidInput {
                field: format!("leases[{}].monthly_rent", lease.id),
                reason: "Monthly rent cannot be negative".into(),
            });
        }
    }
    Ok(())
}

/// The payment due in the same calendar month as `as_of`, if any.
fn current_payment(lease: &LeaseRecord, as_of: NaiveDate) -> Option<&PaymentRecord> {
    lease
        .payments
        .iter()
        .find(|p| p.due_date.month() == as_of.month() && p.due_date.year() == as_of.year())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lease(id: &str, rent: Money, end: NaiveDate, payments: Vec<PaymentRecord>) -> LeaseRecord {
        LeaseRecord {
            id: id.into(),
            tenant: Some(format!("Tenant {id}")),
            unit: Some(format!("Unit {id}")),
            monthly_rent: rent,
            deposit: Some(rent),
            start_date: date(2024, 1, 1),
            end_date: end,
            status: Some(LeaseStatus::Active),
            payments,
        }
    }

    fn paid(due: NaiveDate, amount: Money) -> PaymentRecord {
        PaymentRecord {
            due_date: due,
            amount_due: amount,
            paid_amount: Some(amount),
            status: Some(PaymentStatus::Paid),
        }
    }

    #[test]
    fn test_current_payment_matches_calendar_month() {
        let l = lease(
            "A",
            dec!(1000),
            date(2026, 12, 31),
            vec![paid(date(2025, 5, 1), dec!(1000)), paid(date(2025, 6, 1), dec!(1000))],
        );
        let p = current_payment(&l, date(2025, 6, 15)).unwrap();
        assert_eq!(p.due_date, date(2025, 6, 1));
        assert!(current_payment(&l, date(2024, 6, 15)).is_none());
    }

    #[test]
    fn test_expiring_overrides_overdue() {
        let overdue = PaymentRecord {
            due_date: date(2025, 6, 1),
            amount_due: dec!(1000),
            paid_amount: None,
            status: Some(PaymentStatus::Overdue),
        };
        let input = RentRollInput {
            as_of: date(2025, 6, 11),
            leases: vec![lease("A", dec!(1000), date(2025, 7, 31), vec![overdue])],
            expenses: vec![],
            mortgage_payment: None,
            total_units: None,
        };
        let out = build_rent_roll(&input).unwrap();
        let snap = &out.result.leases[0];
        assert_eq!(snap.status, CollectionStatus::Expiring);
        assert_eq!(snap.days_overdue, 10);
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut l = lease("A", dec!(1000), date(2023, 1, 1), vec![]);
        l.start_date = date(2024, 1, 1);
        let input = RentRollInput {
            as_of: date(2025, 6, 11),
            leases: vec![l],
            expenses: vec![],
            mortgage_payment: None,
            total_units: None,
        };
        assert!(matches!(
            build_rent_roll(&input),
            Err(RentfolioError::DateError(_))
        ));
    }

    #[test]
    fn test_filter_leases() {
        let input = RentRollInput {
            as_of: date(2025, 6, 11),
            leases: vec![
                lease("A", dec!(1000), date(2026, 12, 31), vec![]),
                lease("B", dec!(1200), date(2025, 7, 1), vec![]),
            ],
            expenses: vec![],
            mortgage_payment: None,
            total_units: Some(3),
        };
        let out = build_rent_roll(&input).unwrap();
        let leases = &out.result.leases;
        assert_eq!(filter_leases(leases, LeaseFilter::All).len(), 2);
        assert_eq!(filter_leases(leases, LeaseFilter::Paid)[0].id, "A");
        assert_eq!(filter_leases(leases, LeaseFilter::Expiring)[0].id, "B");
        assert!(filter_leases(leases, LeaseFilter::Overdue).is_empty());
        assert_eq!(out.result.metrics.occupancy, "2/3");
    }

    #[test]
    fn test_totals_beyond_decimal_range_are_rejected() {
        let end = date(2026, 12, 31);
        let input = RentRollInput {
            as_of: date(2025, 6, 11),
            leases: vec![
                lease("A", Decimal::MAX, end, vec![]),
                lease("B", Decimal::MAX, end, vec![]),
            ],
            expenses: vec![],
            mortgage_payment: None,
            total_units: None,
        };
        assert!(matches!(
            build_rent_roll(&input),
            Err(RentfolioError::InvalidInput { .. })
        ));

        // A single lease fits, but its annualised revenue does not.
        let input = RentRollInput {
            leases: vec![lease("A", Decimal::MAX / dec!(2), end, vec![])],
            ..input
        };
        assert!(matches!(
            build_rent_roll(&input),
            Err(RentfolioError::InvalidInput { .. })
        ));
    }
}
