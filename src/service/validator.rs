//! Pre-flight checks for leave requests: overlap, eligibility, balance
//! sufficiency, status-transition legality and holiday lookups.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveStatus;
use crate::model::leave_type::LeaveType;
use crate::service::accountant::{self, BalanceAccountant};
use crate::service::entitlement;
use crate::service::holiday::HolidayCalendar;
use crate::store::{BalanceStore, RequestStore};
use rust_decimal::Decimal;

#[derive(Clone)]
pub struct RequestValidator {
    requests: Arc<dyn RequestStore>,
    balances: Arc<dyn BalanceStore>,
    holidays: HolidayCalendar,
}

impl RequestValidator {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        balances: Arc<dyn BalanceStore>,
        holidays: HolidayCalendar,
    ) -> Self {
        Self {
            requests,
            balances,
            holidays,
        }
    }

    /// Fails with `OverlappingRequest` when any non-cancelled request of the
    /// employee intersects the inclusive [start, end] range.
    pub async fn check_overlap(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<()> {
        let overlapping = self
            .requests
            .find_overlapping(employee_id, start, end)
            .await?;
        if overlapping.is_empty() {
            Ok(())
        } else {
            Err(AppError::OverlappingRequest)
        }
    }

    /// Gender-restriction check, delegated to the entitlement policy.
    pub fn check_eligibility(employee: &Employee, leave_type: &LeaveType) -> AppResult<()> {
        entitlement::check_restriction(employee, leave_type)
    }

    /// Available balance over the rows the accountant would deduct from —
    /// everything effective on or before the target period's end — must
    /// cover the requested days. Grants from later periods do not count.
    pub async fn check_sufficient_balance(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        requested_days: Decimal,
        year: i32,
    ) -> AppResult<()> {
        let (_, period_end) = accountant::period_window(year)?;
        let mut rows = self
            .balances
            .find_by_employee_and_type(employee_id, leave_type_id)
            .await?;
        rows.retain(|row| row.effective_date <= period_end);
        let available = BalanceAccountant::available_balance(&rows)?;
        if available < requested_days {
            return Err(AppError::InsufficientBalance {
                available,
                requested: requested_days,
            });
        }
        Ok(())
    }

    /// Terminal statuses cannot be left, a request cannot return to
    /// `Pending`, and a no-op transition is rejected.
    pub fn validate_status_transition(
        current: LeaveStatus,
        requested: LeaveStatus,
    ) -> AppResult<()> {
        if current.is_terminal() || requested == LeaveStatus::Pending || requested == current {
            return Err(AppError::InvalidTransition {
                from: current,
                to: requested,
            });
        }
        Ok(())
    }

    /// Weekends plus the injected holiday calendar. Callers computing
    /// working-day counts decide whether holidays count toward the
    /// requested days; the core does not enforce it.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || self.holidays.contains(date)
    }

    /// Number of working days in the inclusive range.
    pub fn working_days(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !self.is_holiday(*d))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::NewLeaveRequest;
    use crate::store::memory::{InMemoryBalanceStore, InMemoryRequestStore};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn validator() -> (RequestValidator, Arc<InMemoryRequestStore>) {
        let requests = Arc::new(InMemoryRequestStore::default());
        let balances = Arc::new(InMemoryBalanceStore::default());
        let holidays = HolidayCalendar::new([d(2025, 1, 1)]);
        (
            RequestValidator::new(requests.clone(), balances, holidays),
            requests,
        )
    }

    async fn seed_request(store: &InMemoryRequestStore, start: NaiveDate, end: NaiveDate) {
        store
            .insert(NewLeaveRequest {
                employee_id: 1,
                leave_type_id: 2,
                start_date: start,
                end_date: end,
                requested_days: dec!(1),
                reason: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn intersecting_ranges_overlap() {
        let (validator, requests) = validator();
        seed_request(&requests, d(2025, 3, 1), d(2025, 3, 5)).await;

        let err = validator
            .check_overlap(1, d(2025, 3, 4), d(2025, 3, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OverlappingRequest));
    }

    #[tokio::test]
    async fn adjacent_ranges_do_not_overlap() {
        let (validator, requests) = validator();
        seed_request(&requests, d(2025, 3, 1), d(2025, 3, 5)).await;

        validator
            .check_overlap(1, d(2025, 3, 6), d(2025, 3, 10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_requests_are_ignored_for_overlap() {
        let (validator, requests) = validator();
        seed_request(&requests, d(2025, 3, 1), d(2025, 3, 5)).await;

        let mut cancelled = requests.find_by_id(1).await.unwrap().unwrap();
        cancelled.status = LeaveStatus::Cancelled;
        cancelled.is_cancelled = true;
        requests.update(&cancelled).await.unwrap();

        validator
            .check_overlap(1, d(2025, 3, 1), d(2025, 3, 5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn other_employees_do_not_collide() {
        let (validator, requests) = validator();
        seed_request(&requests, d(2025, 3, 1), d(2025, 3, 5)).await;

        validator
            .check_overlap(9, d(2025, 3, 1), d(2025, 3, 5))
            .await
            .unwrap();
    }

    #[test]
    fn terminal_states_cannot_be_resurrected() {
        let err = RequestValidator::validate_status_transition(
            LeaveStatus::Rejected,
            LeaveStatus::Approved,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: LeaveStatus::Rejected,
                to: LeaveStatus::Approved,
            }
        ));

        assert!(
            RequestValidator::validate_status_transition(
                LeaveStatus::Cancelled,
                LeaveStatus::Rejected,
            )
            .is_err()
        );
    }

    #[test]
    fn pending_can_move_to_any_decision() {
        for to in [
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
        ] {
            RequestValidator::validate_status_transition(LeaveStatus::Pending, to).unwrap();
        }
    }

    #[test]
    fn no_op_and_back_to_pending_are_rejected() {
        assert!(
            RequestValidator::validate_status_transition(
                LeaveStatus::Pending,
                LeaveStatus::Pending,
            )
            .is_err()
        );
        assert!(
            RequestValidator::validate_status_transition(
                LeaveStatus::Approved,
                LeaveStatus::Pending,
            )
            .is_err()
        );
    }

    #[tokio::test]
    async fn holidays_cover_weekends_and_the_calendar() {
        let (validator, _) = validator();
        assert!(validator.is_holiday(d(2025, 1, 1))); // configured holiday
        assert!(validator.is_holiday(d(2025, 3, 1))); // Saturday
        assert!(validator.is_holiday(d(2025, 3, 2))); // Sunday
        assert!(!validator.is_holiday(d(2025, 3, 3))); // Monday

        // Wed Jan 1st is a holiday; the rest of that week has 2 working days
        assert_eq!(validator.working_days(d(2025, 1, 1), d(2025, 1, 5)), 2);
    }

    #[tokio::test]
    async fn sufficiency_checks_total_available() {
        let requests = Arc::new(InMemoryRequestStore::default());
        let balances = Arc::new(InMemoryBalanceStore::default());
        let validator = RequestValidator::new(
            requests,
            balances.clone(),
            HolidayCalendar::default(),
        );

        balances
            .insert(crate::model::leave_balance::NewLeaveBalance {
                employee_id: 1,
                leave_type_id: 2,
                effective_date: d(2025, 1, 1),
                amount: dec!(3),
            })
            .await
            .unwrap();

        validator
            .check_sufficient_balance(1, 2, dec!(3), 2025)
            .await
            .unwrap();
        assert!(matches!(
            validator.check_sufficient_balance(1, 2, dec!(4), 2025).await,
            Err(AppError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn sufficiency_ignores_grants_from_later_periods() {
        let requests = Arc::new(InMemoryRequestStore::default());
        let balances = Arc::new(InMemoryBalanceStore::default());
        let validator = RequestValidator::new(
            requests,
            balances.clone(),
            HolidayCalendar::default(),
        );

        for (year, amount) in [(2025, dec!(3)), (2026, dec!(10))] {
            balances
                .insert(crate::model::leave_balance::NewLeaveBalance {
                    employee_id: 1,
                    leave_type_id: 2,
                    effective_date: d(year, 1, 1),
                    amount,
                })
                .await
                .unwrap();
        }

        // the 2026 grant is not deductible in 2025 and must not count
        assert!(matches!(
            validator.check_sufficient_balance(1, 2, dec!(4), 2025).await,
            Err(AppError::InsufficientBalance { available, .. })
                if available == dec!(3)
        ));
        validator
            .check_sufficient_balance(1, 2, dec!(13), 2026)
            .await
            .unwrap();
    }
}
