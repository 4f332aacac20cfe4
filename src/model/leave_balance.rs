use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One balance row: the quota granted to an employee for one leave type and
/// one accounting period, plus the integer day counter consumed from it.
///
/// Invariant held by the accountant: `0 <= used_days <= amount`.
/// `version` backs the optimistic write check; a stale save fails with
/// `Conflict` and the caller retries the whole operation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "employee_id": 1,
    "leave_type_id": 2,
    "effective_date": "2025-01-01",
    "amount": 14.0,
    "used_days": 3,
    "version": 1
}))]
pub struct LeaveBalance {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = 2)]
    pub leave_type_id: u64,

    /// Start of the period this row covers, typically January 1st.
    #[schema(example = "2025-01-01", value_type = String, format = "date")]
    pub effective_date: NaiveDate,

    /// Granted quota in days; fractional for half-day grants.
    #[schema(example = 14.0, value_type = f64)]
    pub amount: Decimal,

    #[schema(example = 3)]
    pub used_days: i32,

    #[schema(example = 1)]
    pub version: u64,
}

impl LeaveBalance {
    pub fn available(&self) -> Decimal {
        self.amount - Decimal::from(self.used_days)
    }
}

/// Insert payload for a balance row that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewLeaveBalance {
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub effective_date: NaiveDate,
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn available_subtracts_used_days() {
        let row = LeaveBalance {
            id: 1,
            employee_id: 1,
            leave_type_id: 1,
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            amount: dec!(14.5),
            used_days: 3,
            version: 0,
        };
        assert_eq!(row.available(), dec!(11.5));
    }
}
