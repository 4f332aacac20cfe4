//! The leave-request state machine. Ties status transitions to their
//! balance side effects: a PENDING request holds a provisional reservation
//! taken at creation, approval confirms it, rejection or cancellation
//! releases it.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest, inclusive_days};
use crate::service::accountant::BalanceAccountant;
use crate::service::entitlement;
use crate::service::validator::RequestValidator;
use crate::store::{EmployeeLookup, LeaveTypeLookup, RequestFilter, RequestStore};

#[derive(Clone)]
pub struct RequestLifecycle {
    employees: Arc<dyn EmployeeLookup>,
    leave_types: Arc<dyn LeaveTypeLookup>,
    requests: Arc<dyn RequestStore>,
    accountant: BalanceAccountant,
    validator: RequestValidator,
}

impl RequestLifecycle {
    pub fn new(
        employees: Arc<dyn EmployeeLookup>,
        leave_types: Arc<dyn LeaveTypeLookup>,
        requests: Arc<dyn RequestStore>,
        accountant: BalanceAccountant,
        validator: RequestValidator,
    ) -> Self {
        Self {
            employees,
            leave_types,
            requests,
            accountant,
            validator,
        }
    }

    /// File a new request. Validation runs before any balance mutation;
    /// on success the requested days are deducted immediately so that a
    /// concurrent request cannot be approved against the same balance.
    pub async fn create(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> AppResult<LeaveRequest> {
        if start_date > end_date {
            return Err(AppError::InvalidInput(format!(
                "start date {start_date} is after end date {end_date}"
            )));
        }

        let employee = self.employees.find_by_id(employee_id).await?;
        let leave_type = self.leave_types.find_by_id(leave_type_id).await?;
        let requested_days = inclusive_days(start_date, end_date);

        RequestValidator::check_eligibility(&employee, &leave_type)?;
        self.validator
            .check_overlap(employee_id, start_date, end_date)
            .await?;
        self.validator
            .check_sufficient_balance(employee_id, leave_type_id, requested_days, start_date.year())
            .await?;

        // optimistic reservation; released again on rejection/cancellation
        self.accountant
            .deduct(employee_id, leave_type_id, requested_days, start_date.year())
            .await?;

        let insert = self
            .requests
            .insert(NewLeaveRequest {
                employee_id,
                leave_type_id,
                start_date,
                end_date,
                requested_days,
                reason,
            })
            .await;
        let created = match insert {
            Ok(created) => created,
            Err(e) => {
                // no request was persisted, so the reservation must not outlive
                // this call
                if let Err(release) = self
                    .accountant
                    .add(employee_id, leave_type_id, requested_days, start_date.year())
                    .await
                {
                    tracing::error!(
                        employee_id,
                        leave_type_id,
                        error = %release,
                        "failed to release the reservation of a failed insert"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            request_id = created.id,
            employee_id,
            leave_type_id,
            days = %requested_days,
            "leave request created"
        );
        Ok(created)
    }

    /// Drive a request to a new status, applying the balance side effect of
    /// the transition. Terminal statuses reject every further change, so a
    /// release can never run twice.
    pub async fn change_status(
        &self,
        request_id: u64,
        new_status: LeaveStatus,
        approver_id: Option<u64>,
        note: Option<String>,
    ) -> AppResult<LeaveRequest> {
        let mut request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("LeaveRequest {request_id}")))?;

        RequestValidator::validate_status_transition(request.status, new_status)?;

        if let Some(approver_id) = approver_id {
            // approver must exist; it is a reference, not ownership
            self.employees.find_by_id(approver_id).await?;
        }

        let old_status = request.status;
        request.status = new_status;
        match new_status {
            LeaveStatus::Approved => {
                request.approved_by = approver_id;
                request.approved_at = Some(Utc::now());
                request.approval_note = note;
            }
            LeaveStatus::Rejected => {
                request.approved_by = approver_id;
                request.approval_note = note;
            }
            LeaveStatus::Cancelled => {
                request.is_cancelled = true;
                request.cancelled_at = Some(Utc::now());
                request.cancellation_reason = note;
            }
            LeaveStatus::Pending => {}
        }

        // The version-checked write must land before the balance side effect:
        // a losing concurrent writer fails here with Conflict and its retry
        // re-reads the stored (now terminal) status, so the reservation can
        // only ever be released once.
        self.requests.update(&request).await?;
        request.version += 1;

        if matches!(new_status, LeaveStatus::Rejected | LeaveStatus::Cancelled) {
            // release the reservation held since creation
            self.accountant
                .add(
                    request.employee_id,
                    request.leave_type_id,
                    request.requested_days,
                    request.start_date.year(),
                )
                .await?;
        }

        tracing::info!(
            request_id,
            from = %old_status,
            to = %new_status,
            "leave request status changed"
        );
        Ok(request)
    }

    pub async fn get(&self, request_id: u64) -> AppResult<LeaveRequest> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("LeaveRequest {request_id}")))
    }

    pub async fn search(&self, filter: &RequestFilter) -> AppResult<Vec<LeaveRequest>> {
        self.requests.search(filter).await
    }

    /// Administrative entry point: grant the employee's policy allowance
    /// for the period.
    pub async fn grant_annual_allowance(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        year: i32,
    ) -> AppResult<LeaveBalance> {
        let employee = self.employees.find_by_id(employee_id).await?;
        let leave_type = self.leave_types.find_by_id(leave_type_id).await?;
        let today = Utc::now().date_naive();

        let allowance = entitlement::annual_allowance(&employee, &leave_type, today)?
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "leave type '{}' has no fixed annual allowance",
                    leave_type.name
                ))
            })?;

        let granted = self
            .accountant
            .grant(&employee, &leave_type, allowance, year, today)
            .await?;

        tracing::info!(
            employee_id,
            leave_type_id,
            year,
            amount = %allowance,
            "annual allowance granted"
        );
        Ok(granted)
    }

    pub async fn available_balance(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        year: i32,
    ) -> AppResult<Decimal> {
        self.accountant
            .get_available(employee_id, leave_type_id, year)
            .await
    }
}
