//! Balance accounting: available-balance computation, oldest-first
//! deduction, carry-over and period grants. All mutations go through the
//! balance store's atomic batch save.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;
use crate::model::leave_balance::{LeaveBalance, NewLeaveBalance};
use crate::model::leave_type::LeaveType;
use crate::service::entitlement;
use crate::store::BalanceStore;

#[derive(Clone)]
pub struct BalanceAccountant {
    balances: Arc<dyn BalanceStore>,
}

/// Calendar-year window for a period: January 1st through December 31st.
pub fn period_window(year: i32) -> AppResult<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::from_ymd_opt(year, 1, 1);
    let to = NaiveDate::from_ymd_opt(year, 12, 31);
    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(AppError::InvalidInput(format!("invalid year: {year}"))),
    }
}

fn whole_days(value: Decimal) -> AppResult<i32> {
    value
        .trunc()
        .to_i32()
        .ok_or_else(|| AppError::InvalidInput(format!("day count out of range: {value}")))
}

impl BalanceAccountant {
    pub fn new(balances: Arc<dyn BalanceStore>) -> Self {
        Self { balances }
    }

    /// Total available balance across the supplied rows:
    /// `sum(amount) - sum(used_days)`.
    pub fn available_balance(rows: &[LeaveBalance]) -> AppResult<Decimal> {
        let mut total = Decimal::ZERO;
        for row in rows {
            if row.amount < Decimal::ZERO {
                return Err(AppError::InvalidInput(format!(
                    "negative balance amount on row {}",
                    row.id
                )));
            }
            total += row.available();
        }
        Ok(total)
    }

    /// Available balance for one (employee, leave type, period). An empty
    /// row set reads as zero.
    pub async fn get_available(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        year: i32,
    ) -> AppResult<Decimal> {
        let (from, to) = period_window(year)?;
        let rows = self
            .balances
            .find_in_period(employee_id, leave_type_id, from, to)
            .await?;
        Self::available_balance(&rows)
    }

    /// Consume `amount_days` from every row effective on or before the end
    /// of the target period, oldest effective date first, so
    /// earliest-expiring leave is spent before newer grants. Fractional
    /// consumption is floored when crediting the integer `used_days`
    /// counter. Fails without touching storage when the total available
    /// balance is short.
    pub async fn deduct(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        amount_days: Decimal,
        year: i32,
    ) -> AppResult<()> {
        if amount_days <= Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "requested days must be greater than zero, got {amount_days}"
            )));
        }

        let (_, period_end) = period_window(year)?;
        let mut rows = self
            .balances
            .find_by_employee_and_type(employee_id, leave_type_id)
            .await?;
        rows.retain(|row| row.effective_date <= period_end);
        if rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "LeaveBalance for employee {employee_id}, leave type {leave_type_id}, year {year}"
            )));
        }

        let total = Self::available_balance(&rows)?;
        if total < amount_days {
            return Err(AppError::InsufficientBalance {
                available: total,
                requested: amount_days,
            });
        }

        let mut remaining = amount_days;
        for row in rows.iter_mut() {
            if remaining <= Decimal::ZERO {
                break;
            }
            let available = row.available();
            if available <= Decimal::ZERO {
                continue;
            }
            if available >= remaining {
                row.used_days += whole_days(remaining)?;
                remaining = Decimal::ZERO;
            } else {
                row.used_days += whole_days(available)?;
                remaining -= available;
            }
        }

        self.balances.save_batch(&rows, &[]).await
    }

    /// Restore `amount_days` into the period's row, creating it when absent,
    /// together with the carry-over from strictly earlier periods.
    ///
    /// Carry-over moves whole days only: each earlier row's floored
    /// available amount is added to the current row and marked consumed on
    /// the source, so a repeated call finds nothing left to carry.
    /// Sub-day residue stays available on its original row.
    pub async fn add(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        amount_days: Decimal,
        year: i32,
    ) -> AppResult<()> {
        if amount_days < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "amount to add must not be negative, got {amount_days}"
            )));
        }

        let (period_start, period_end) = period_window(year)?;
        let all = self
            .balances
            .find_by_employee_and_type(employee_id, leave_type_id)
            .await?;

        let mut updates: Vec<LeaveBalance> = Vec::new();
        let mut carry_over = Decimal::ZERO;
        let mut current: Option<LeaveBalance> = None;

        for mut row in all {
            if row.effective_date < period_start {
                let whole = row.available().trunc();
                if whole > Decimal::ZERO {
                    carry_over += whole;
                    row.used_days += whole_days(whole)?;
                    updates.push(row);
                }
            } else if row.effective_date <= period_end && current.is_none() {
                current = Some(row);
            }
        }

        match current {
            Some(mut row) => {
                row.amount += amount_days + carry_over;
                updates.push(row);
                self.balances.save_batch(&updates, &[]).await
            }
            None => {
                let insert = NewLeaveBalance {
                    employee_id,
                    leave_type_id,
                    effective_date: period_start,
                    amount: amount_days + carry_over,
                };
                self.balances.save_batch(&updates, &[insert]).await
            }
        }
    }

    /// Create the period's balance row. Fails with `AlreadyExists` when the
    /// period already has one (callers adjust existing periods through
    /// `add`/`deduct`) and enforces the entitlement ceiling.
    pub async fn grant(
        &self,
        employee: &Employee,
        leave_type: &LeaveType,
        amount_days: Decimal,
        year: i32,
        as_of: NaiveDate,
    ) -> AppResult<LeaveBalance> {
        if amount_days < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "granted amount must not be negative, got {amount_days}"
            )));
        }
        if let Some(allowance) = entitlement::annual_allowance(employee, leave_type, as_of)? {
            if amount_days > allowance {
                return Err(AppError::InvalidInput(format!(
                    "grant of {amount_days} days exceeds the annual allowance of {allowance}"
                )));
            }
        }

        let (from, to) = period_window(year)?;
        let existing = self
            .balances
            .find_in_period(employee.id, leave_type.id, from, to)
            .await?;
        if !existing.is_empty() {
            return Err(AppError::AlreadyExists(format!(
                "LeaveBalance for employee {}, leave type {}, year {year}",
                employee.id, leave_type.id
            )));
        }

        self.balances
            .insert(NewLeaveBalance {
                employee_id: employee.id,
                leave_type_id: leave_type.id,
                effective_date: from,
                amount: amount_days,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::Gender;
    use crate::store::memory::InMemoryBalanceStore;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn accountant() -> (BalanceAccountant, Arc<InMemoryBalanceStore>) {
        let store = Arc::new(InMemoryBalanceStore::default());
        (BalanceAccountant::new(store.clone()), store)
    }

    async fn seed(store: &InMemoryBalanceStore, year: i32, amount: Decimal, used: i32) {
        let row = store
            .insert(NewLeaveBalance {
                employee_id: 1,
                leave_type_id: 2,
                effective_date: d(year, 1, 1),
                amount,
            })
            .await
            .unwrap();
        if used > 0 {
            let mut updated = row;
            updated.used_days = used;
            store.save_batch(&[updated], &[]).await.unwrap();
        }
    }

    #[test]
    fn available_balance_rejects_negative_amounts() {
        let row = LeaveBalance {
            id: 1,
            employee_id: 1,
            leave_type_id: 2,
            effective_date: d(2025, 1, 1),
            amount: dec!(-1),
            used_days: 0,
            version: 0,
        };
        assert!(matches!(
            BalanceAccountant::available_balance(&[row]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn deduct_consumes_oldest_period_first() {
        let (accountant, store) = accountant();
        seed(&store, 2023, dec!(5), 0).await;
        seed(&store, 2024, dec!(10), 0).await;

        accountant.deduct(1, 2, dec!(8), 2024).await.unwrap();

        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        assert_eq!(rows[0].available(), dec!(0)); // 2023 emptied first
        assert_eq!(rows[1].available(), dec!(7));
    }

    #[tokio::test]
    async fn deduct_ignores_rows_from_later_periods() {
        let (accountant, store) = accountant();
        seed(&store, 2024, dec!(2), 0).await;
        seed(&store, 2026, dec!(10), 0).await;

        // the 2026 grant is not yet effective for a 2024 deduction
        let err = accountant.deduct(1, 2, dec!(5), 2024).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));
    }

    #[tokio::test]
    async fn deduct_fails_and_leaves_state_unchanged_when_short() {
        let (accountant, store) = accountant();
        seed(&store, 2025, dec!(3), 1).await;

        let err = accountant.deduct(1, 2, dec!(5), 2025).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientBalance { available, requested }
                if available == dec!(2) && requested == dec!(5)
        ));

        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        assert_eq!(rows[0].used_days, 1);
    }

    #[tokio::test]
    async fn deduct_without_rows_is_not_found() {
        let (accountant, _store) = accountant();
        assert!(matches!(
            accountant.deduct(1, 2, dec!(1), 2025).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deduct_floors_fractional_days() {
        let (accountant, store) = accountant();
        seed(&store, 2025, dec!(4), 0).await;

        accountant.deduct(1, 2, dec!(2.5), 2025).await.unwrap();

        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        // integer counter credits the floor; the half day is not recorded
        assert_eq!(rows[0].used_days, 2);
        assert_eq!(rows[0].available(), dec!(2));
    }

    #[tokio::test]
    async fn invariant_holds_after_deduct() {
        let (accountant, store) = accountant();
        seed(&store, 2025, dec!(6), 2).await;

        accountant.deduct(1, 2, dec!(4), 2025).await.unwrap();

        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        for row in &rows {
            assert!(row.used_days >= 0);
            assert!(Decimal::from(row.used_days) <= row.amount);
        }
    }

    #[tokio::test]
    async fn add_carries_over_and_consumes_the_source() {
        let (accountant, store) = accountant();
        seed(&store, 2024, dec!(5), 2).await; // 3 available to carry

        accountant.add(1, 2, dec!(4), 2025).await.unwrap();

        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        let old = &rows[0];
        let current = &rows[1];
        assert_eq!(current.effective_date, d(2025, 1, 1));
        assert_eq!(current.amount, dec!(7)); // 4 added + 3 carried
        assert_eq!(old.available(), dec!(0)); // source marked consumed

        // a second add must not re-carry the same days
        accountant.add(1, 2, dec!(1), 2025).await.unwrap();
        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        assert_eq!(rows[1].amount, dec!(8));
    }

    #[tokio::test]
    async fn add_keeps_fractional_residue_on_the_source_row() {
        let (accountant, store) = accountant();
        seed(&store, 2024, dec!(2.5), 0).await;

        accountant.add(1, 2, dec!(0), 2025).await.unwrap();

        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        assert_eq!(rows[0].available(), dec!(0.5)); // only whole days moved
        assert_eq!(rows[1].amount, dec!(2));
    }

    #[tokio::test]
    async fn grant_rejects_duplicates_and_ceiling_violations() {
        let (accountant, store) = accountant();
        let employee = Employee {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Test".into(),
            gender: Gender::Female,
            employment_start_date: d(2018, 1, 1),
        };
        let annual = LeaveType {
            id: 2,
            name: "Annual Leave".into(),
            is_annual: true,
            is_unpaid: false,
            gender_required: None,
            default_days: None,
            valid_after_days: None,
            valid_until_days: None,
            borrowable_limit: None,
            max_days: None,
            reset_period: None,
        };
        let as_of = d(2025, 6, 1); // 7 completed years -> allowance 20

        let err = accountant
            .grant(&employee, &annual, dec!(25), 2025, as_of)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        accountant
            .grant(&employee, &annual, dec!(20), 2025, as_of)
            .await
            .unwrap();
        assert!(matches!(
            accountant
                .grant(&employee, &annual, dec!(5), 2025, as_of)
                .await,
            Err(AppError::AlreadyExists(_))
        ));

        let rows = store.find_by_employee_and_type(1, 2).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(20));
    }
}
