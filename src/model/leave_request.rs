use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Leave request status. `Rejected` and `Cancelled` are terminal: once
/// reached, no further transition is permitted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sqlx(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// Strict parse; unknown input fails loudly instead of defaulting.
    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value.trim())
            .map_err(|_| AppError::InvalidInput(format!("unknown leave status: {value}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 42,
    "employee_id": 1,
    "leave_type_id": 2,
    "start_date": "2025-03-01",
    "end_date": "2025-03-05",
    "requested_days": 5.0,
    "status": "pending",
    "reason": "family visit",
    "approved_by": null,
    "approved_at": null,
    "approval_note": null,
    "is_cancelled": false,
    "cancelled_at": null,
    "cancellation_reason": null,
    "version": 0
}))]
pub struct LeaveRequest {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = 2)]
    pub leave_type_id: u64,

    #[schema(example = "2025-03-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2025-03-05", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// Inclusive day count between start and end.
    #[schema(example = 5.0, value_type = f64)]
    pub requested_days: Decimal,

    #[schema(example = "pending")]
    pub status: LeaveStatus,

    #[schema(example = "family visit", nullable = true)]
    pub reason: Option<String>,

    /// Approver reference, not ownership; the request belongs to the
    /// employee who filed it.
    #[schema(example = json!(null), nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(example = json!(null), nullable = true)]
    pub approval_note: Option<String>,

    pub is_cancelled: bool,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub cancelled_at: Option<DateTime<Utc>>,

    #[schema(example = json!(null), nullable = true)]
    pub cancellation_reason: Option<String>,

    #[schema(example = 0)]
    pub version: u64,
}

/// Insert payload; status always starts at `Pending`.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub requested_days: Decimal,
    pub reason: Option<String>,
}

/// Inclusive day count: `end - start + 1`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> Decimal {
    Decimal::from((end - start).num_days() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_parse_is_strict() {
        assert_eq!(LeaveStatus::parse("APPROVED").unwrap(), LeaveStatus::Approved);
        assert_eq!(LeaveStatus::parse("approved").unwrap(), LeaveStatus::Approved);
        assert!(matches!(
            LeaveStatus::parse("archived"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn terminal_statuses() {
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(!LeaveStatus::Approved.is_terminal());
    }

    #[test]
    fn day_count_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(inclusive_days(start, end), dec!(5));
        assert_eq!(inclusive_days(start, start), dec!(1));
    }
}
