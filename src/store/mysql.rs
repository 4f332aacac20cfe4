//! MySQL-backed store implementations.
//!
//! Queries are built at runtime (`query_as` + `bind`) so the crate compiles
//! without a live database. Mutations are version-checked; batches run in a
//! single transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;
use crate::model::leave_balance::{LeaveBalance, NewLeaveBalance};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::model::leave_type::LeaveType;

use super::{BalanceStore, EmployeeLookup, LeaveTypeLookup, RequestFilter, RequestStore};

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Clone)]
pub struct MySqlEmployeeLookup {
    pool: MySqlPool,
}

impl MySqlEmployeeLookup {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeLookup for MySqlEmployeeLookup {
    async fn find_by_id(&self, id: u64) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, first_name, last_name, gender, employment_start_date
            FROM employee
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {id}")))
    }
}

#[derive(Clone)]
pub struct MySqlLeaveTypeLookup {
    pool: MySqlPool,
}

impl MySqlLeaveTypeLookup {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const LEAVE_TYPE_COLUMNS: &str = "id, name, is_annual, is_unpaid, gender_required, default_days, \
     valid_after_days, valid_until_days, borrowable_limit, max_days, reset_period";

#[async_trait]
impl LeaveTypeLookup for MySqlLeaveTypeLookup {
    async fn find_by_id(&self, id: u64) -> AppResult<LeaveType> {
        let sql = format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_type WHERE id = ?");
        sqlx::query_as::<_, LeaveType>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("LeaveType {id}")))
    }

    async fn list(&self) -> AppResult<Vec<LeaveType>> {
        let sql = format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_type ORDER BY id");
        Ok(sqlx::query_as::<_, LeaveType>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[derive(Clone)]
pub struct MySqlBalanceStore {
    pool: MySqlPool,
}

impl MySqlBalanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const BALANCE_COLUMNS: &str =
    "id, employee_id, leave_type_id, effective_date, amount, used_days, version";

#[async_trait]
impl BalanceStore for MySqlBalanceStore {
    async fn find_by_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveBalance>> {
        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balance \
             WHERE employee_id = ? ORDER BY effective_date ASC"
        );
        Ok(sqlx::query_as::<_, LeaveBalance>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_employee_and_type(
        &self,
        employee_id: u64,
        leave_type_id: u64,
    ) -> AppResult<Vec<LeaveBalance>> {
        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balance \
             WHERE employee_id = ? AND leave_type_id = ? ORDER BY effective_date ASC"
        );
        Ok(sqlx::query_as::<_, LeaveBalance>(&sql)
            .bind(employee_id)
            .bind(leave_type_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_in_period(
        &self,
        employee_id: u64,
        leave_type_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveBalance>> {
        let sql = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balance \
             WHERE employee_id = ? AND leave_type_id = ? \
             AND effective_date BETWEEN ? AND ? ORDER BY effective_date ASC"
        );
        Ok(sqlx::query_as::<_, LeaveBalance>(&sql)
            .bind(employee_id)
            .bind(leave_type_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert(&self, row: NewLeaveBalance) -> AppResult<LeaveBalance> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_balance
                (employee_id, leave_type_id, effective_date, amount, used_days, version)
            VALUES (?, ?, ?, ?, 0, 0)
            "#,
        )
        .bind(row.employee_id)
        .bind(row.leave_type_id)
        .bind(row.effective_date)
        .bind(row.amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AlreadyExists(format!(
                    "LeaveBalance for employee {}, leave type {}, period {}",
                    row.employee_id, row.leave_type_id, row.effective_date
                ))
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(LeaveBalance {
            id: result.last_insert_id(),
            employee_id: row.employee_id,
            leave_type_id: row.leave_type_id,
            effective_date: row.effective_date,
            amount: row.amount,
            used_days: 0,
            version: 0,
        })
    }

    async fn save_batch(
        &self,
        updates: &[LeaveBalance],
        inserts: &[NewLeaveBalance],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for row in updates {
            let result = sqlx::query(
                r#"
                UPDATE leave_balance
                SET amount = ?, used_days = ?, version = version + 1
                WHERE id = ? AND version = ?
                "#,
            )
            .bind(row.amount)
            .bind(row.used_days)
            .bind(row.id)
            .bind(row.version)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // dropping the transaction rolls the batch back
                return Err(AppError::Conflict(format!("leave balance {}", row.id)));
            }
        }

        for row in inserts {
            sqlx::query(
                r#"
                INSERT INTO leave_balance
                    (employee_id, leave_type_id, effective_date, amount, used_days, version)
                VALUES (?, ?, ?, ?, 0, 0)
                "#,
            )
            .bind(row.employee_id)
            .bind(row.leave_type_id)
            .bind(row.effective_date)
            .bind(row.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct MySqlRequestStore {
    pool: MySqlPool,
}

impl MySqlRequestStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const REQUEST_COLUMNS: &str = "id, employee_id, leave_type_id, start_date, end_date, \
     requested_days, status, reason, approved_by, approved_at, approval_note, \
     is_cancelled, cancelled_at, cancellation_reason, version";

// Typed bind values for the dynamic search query
enum FilterValue {
    U64(u64),
    Status(LeaveStatus),
    Date(NaiveDate),
    Bool(bool),
}

#[async_trait]
impl RequestStore for MySqlRequestStore {
    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_request WHERE id = ?");
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_overlapping(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request \
             WHERE employee_id = ? AND start_date <= ? AND end_date >= ? \
             AND is_cancelled = FALSE ORDER BY start_date ASC"
        );
        Ok(sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(employee_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn search(&self, filter: &RequestFilter) -> AppResult<Vec<LeaveRequest>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }
        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Status(status));
        }
        if let Some(approved_by) = filter.approved_by {
            where_sql.push_str(" AND approved_by = ?");
            args.push(FilterValue::U64(approved_by));
        }
        if let Some(from) = filter.start_from {
            where_sql.push_str(" AND start_date >= ?");
            args.push(FilterValue::Date(from));
        }
        if let Some(to) = filter.start_to {
            where_sql.push_str(" AND start_date <= ?");
            args.push(FilterValue::Date(to));
        }
        if let Some(cancelled) = filter.cancelled {
            where_sql.push_str(" AND is_cancelled = ?");
            args.push(FilterValue::Bool(cancelled));
        }

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request{where_sql} ORDER BY start_date DESC"
        );

        let mut query = sqlx::query_as::<_, LeaveRequest>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Status(v) => query.bind(v),
                FilterValue::Date(v) => query.bind(v),
                FilterValue::Bool(v) => query.bind(v),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn insert(&self, row: NewLeaveRequest) -> AppResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_request
                (employee_id, leave_type_id, start_date, end_date, requested_days,
                 status, reason, is_cancelled, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, FALSE, 0)
            "#,
        )
        .bind(row.employee_id)
        .bind(row.leave_type_id)
        .bind(row.start_date)
        .bind(row.end_date)
        .bind(row.requested_days)
        .bind(LeaveStatus::Pending)
        .bind(&row.reason)
        .execute(&self.pool)
        .await?;

        Ok(LeaveRequest {
            id: result.last_insert_id(),
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
        })
    }

    async fn update(&self, row: &LeaveRequest) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE leave_request
            SET status = ?, approved_by = ?, approved_at = ?, approval_note = ?,
                is_cancelled = ?, cancelled_at = ?, cancellation_reason = ?,
                version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(row.status)
        .bind(row.approved_by)
        .bind(row.approved_at)
        .bind(&row.approval_note)
        .bind(row.is_cancelled)
        .bind(row.cancelled_at)
        .bind(&row.cancellation_reason)
        .bind(row.id)
        .bind(row.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!("leave request {}", row.id)));
        }
        Ok(())
    }
}
