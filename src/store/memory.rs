//! In-memory store implementations backing the service tests. They enforce
//! the same contracts as the MySQL stores: ascending period order, unique
//! (employee, leave type, effective date) balance keys, and version-checked
//! writes that fail with `Conflict` when stale.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;
use crate::model::leave_balance::{LeaveBalance, NewLeaveBalance};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::leave_type::LeaveType;

use super::{BalanceStore, EmployeeLookup, LeaveTypeLookup, RequestFilter, RequestStore};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
pub struct InMemoryEmployeeLookup {
    employees: Mutex<HashMap<u64, Employee>>,
}

impl InMemoryEmployeeLookup {
    pub fn put(&self, employee: Employee) {
        lock(&self.employees).insert(employee.id, employee);
    }
}

#[async_trait]
impl EmployeeLookup for InMemoryEmployeeLookup {
    async fn find_by_id(&self, id: u64) -> AppResult<Employee> {
        lock(&self.employees)
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Employee {id}")))
    }
}

#[derive(Default)]
pub struct InMemoryLeaveTypeLookup {
    types: Mutex<HashMap<u64, LeaveType>>,
}

impl InMemoryLeaveTypeLookup {
    pub fn put(&self, leave_type: LeaveType) {
        lock(&self.types).insert(leave_type.id, leave_type);
    }
}

#[async_trait]
impl LeaveTypeLookup for InMemoryLeaveTypeLookup {
    async fn find_by_id(&self, id: u64) -> AppResult<LeaveType> {
        lock(&self.types)
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("LeaveType {id}")))
    }

    async fn list(&self) -> AppResult<Vec<LeaveType>> {
        let mut all: Vec<LeaveType> = lock(&self.types).values().cloned().collect();
        all.sort_by_key(|t| t.id);
        Ok(all)
    }
}

#[derive(Default)]
pub struct InMemoryBalanceStore {
    rows: Mutex<Vec<LeaveBalance>>,
    next_id: AtomicU64,
}

impl InMemoryBalanceStore {
    fn sorted(mut rows: Vec<LeaveBalance>) -> Vec<LeaveBalance> {
        rows.sort_by_key(|r| r.effective_date);
        rows
    }

    fn insert_locked(
        rows: &mut Vec<LeaveBalance>,
        next_id: &AtomicU64,
        row: &NewLeaveBalance,
    ) -> AppResult<LeaveBalance> {
        if rows.iter().any(|r| {
            r.employee_id == row.employee_id
                && r.leave_type_id == row.leave_type_id
                && r.effective_date == row.effective_date
        }) {
            return Err(AppError::AlreadyExists(format!(
                "LeaveBalance for employee {}, leave type {}, period {}",
                row.employee_id, row.leave_type_id, row.effective_date
            )));
        }
        let created = LeaveBalance {
            id: next_id.fetch_add(1, Ordering::SeqCst) + 1,
            employee_id: row.employee_id,
            leave_type_id: row.leave_type_id,
            effective_date: row.effective_date,
            amount: row.amount,
            used_days: 0,
            version: 0,
        };
        rows.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveBalance>> {
        let rows = lock(&self.rows);
        Ok(Self::sorted(
            rows.iter()
                .filter(|r| r.employee_id == employee_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_employee_and_type(
        &self,
        employee_id: u64,
        leave_type_id: u64,
    ) -> AppResult<Vec<LeaveBalance>> {
        let rows = lock(&self.rows);
        Ok(Self::sorted(
            rows.iter()
                .filter(|r| r.employee_id == employee_id && r.leave_type_id == leave_type_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_in_period(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveBalance>> {
        let rows = lock(&self.rows);
        Ok(Self::sorted(
            rows.iter()
                .filter(|r| {
                    r.employee_id == employee_id
                        && r.leave_type_id == leave_type_id
                        && r.effective_date >= from
                        && r.effective_date <= to
                })
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&self, row: NewLeaveBalance) -> AppResult<LeaveBalance> {
        let mut rows = lock(&self.rows);
        Self::insert_locked(&mut rows, &self.next_id, &row)
    }

    async fn save_batch(
        &self,
        updates: &[LeaveBalance],
        inserts: &[NewLeaveBalance],
    ) -> AppResult<()> {
        let mut rows = lock(&self.rows);

        // validate the whole batch before touching anything
        for update in updates {
            let stored = rows
                .iter()
                .find(|r| r.id == update.id)
                .ok_or_else(|| AppError::NotFound(format!("LeaveBalance {}", update.id)))?;
            if stored.version != update.version {
                return Err(AppError::Conflict(format!("leave balance {}", update.id)));
            }
        }

        for update in updates {
            if let Some(stored) = rows.iter_mut().find(|r| r.id == update.id) {
                stored.amount = update.amount;
                stored.used_days = update.used_days;
                stored.version += 1;
            }
        }
        for insert in inserts {
            Self::insert_locked(&mut rows, &self.next_id, insert)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRequestStore {
    rows: Mutex<Vec<LeaveRequest>>,
    next_id: AtomicU64,
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        Ok(lock(&self.rows).iter().find(|r| r.id == id).cloned())
    }

    async fn find_overlapping(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|r| {
                r.employee_id == employee_id
                    && !r.is_cancelled
                    && r.start_date <= end
                    && r.end_date >= start
            })
            .cloned()
            .collect())
    }

    async fn search(&self, filter: &RequestFilter) -> AppResult<Vec<LeaveRequest>> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|r| {
                filter.employee_id.is_none_or(|id| r.employee_id == id)
                    && filter.status.is_none_or(|s| r.status == s)
                    && filter.approved_by.is_none_or(|id| r.approved_by == Some(id))
                    && filter.start_from.is_none_or(|d| r.start_date >= d)
                    && filter.start_to.is_none_or(|d| r.start_date <= d)
                    && filter.cancelled.is_none_or(|c| r.is_cancelled == c)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, row: NewLeaveRequest) -> AppResult<LeaveRequest> {
        let created = LeaveRequest {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            employee_id: row.employee_id,
            leave_type_id: row.leave_type_id,
            start_date: row.start_date,
            end_date: row.end_date,
            requested_days: row.requested_days,
            status: LeaveStatus::Pending,
            reason: row.reason,
            approved_by: None,
            approved_at: None,
            approval_note: None,
            is_cancelled: false,
            cancelled_at: None,
            cancellation_reason: None,
            version: 0,
        };
        lock(&self.rows).push(created.clone());
        Ok(created)
    }

    async fn update(&self, row: &LeaveRequest) -> AppResult<()> {
        let mut rows = lock(&self.rows);
        let stored = rows
            .iter_mut()
            .find(|r| r.id == row.id)
            .ok_or_else(|| AppError::NotFound(format!("LeaveRequest {}", row.id)))?;
        if stored.version != row.version {
            return Err(AppError::Conflict(format!("leave request {}", row.id)));
        }
        *stored = row.clone();
        stored.version += 1;
        Ok(())
    }
}
