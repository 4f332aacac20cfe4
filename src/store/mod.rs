//! Storage collaborators. The core talks to durable storage only through
//! these narrow traits; business rules never live here.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppResult;
use crate::model::employee::Employee;
use crate::model::leave_balance::{LeaveBalance, NewLeaveBalance};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::leave_type::LeaveType;

pub mod memory;
pub mod mysql;

#[async_trait]
pub trait EmployeeLookup: Send + Sync {
    async fn find_by_id(&self, id: u64) -> AppResult<Employee>;
}

#[async_trait]
pub trait LeaveTypeLookup: Send + Sync {
    async fn find_by_id(&self, id: u64) -> AppResult<LeaveType>;
    async fn list(&self) -> AppResult<Vec<LeaveType>>;
}

/// Durable per-(employee, leave-type, period) balance records.
///
/// Ordering contract: every query method returns rows sorted by
/// `effective_date` ascending, oldest period first. The accountant depends
/// on this for oldest-first deduction and carry-over.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveBalance>>;

    async fn find_by_employee_and_type(
        &self,
        employee_id: u64,
        leave_type_id: u64,
    ) -> AppResult<Vec<LeaveBalance>>;

    async fn find_in_period(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveBalance>>;

    async fn insert(&self, row: NewLeaveBalance) -> AppResult<LeaveBalance>;

    /// Atomic batch save: all updates and inserts succeed together or not at
    /// all. Updates are version-checked; a stale row fails the whole batch
    /// with `Conflict`.
    async fn save_batch(
        &self,
        updates: &[LeaveBalance],
        inserts: &[NewLeaveBalance],
    ) -> AppResult<()>;
}

/// Filter for the request query surface. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub approved_by: Option<u64>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
    pub cancelled: Option<bool>,
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>>;

    /// Non-cancelled requests of the employee whose inclusive [start, end]
    /// range intersects the given one.
    async fn find_overlapping(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>>;

    async fn search(&self, filter: &RequestFilter) -> AppResult<Vec<LeaveRequest>>;

    async fn insert(&self, row: NewLeaveRequest) -> AppResult<LeaveRequest>;

    /// Version-checked update of a single request; stale version fails with
    /// `Conflict`.
    async fn update(&self, row: &LeaveRequest) -> AppResult<()>;
}
