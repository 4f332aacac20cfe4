use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::employee::Gender;

/// Immutable leave-type reference data. Administered outside the core; the
/// engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 2,
    "name": "Annual Leave",
    "is_annual": true,
    "is_unpaid": false,
    "gender_required": null,
    "default_days": 14,
    "valid_after_days": 90,
    "valid_until_days": null,
    "borrowable_limit": 5,
    "max_days": 26,
    "reset_period": "yearly"
}))]
pub struct LeaveType {
    #[schema(example = 2)]
    pub id: u64,

    #[schema(example = "Annual Leave")]
    pub name: String,

    pub is_annual: bool,

    pub is_unpaid: bool,

    /// Restricts the type to one gender when set (e.g. maternity leave).
    #[schema(example = json!(null), nullable = true)]
    pub gender_required: Option<Gender>,

    /// Entitlement baseline for types without a tenure/name rule.
    #[schema(example = 14, nullable = true)]
    pub default_days: Option<i32>,

    /// Eligibility window measured in days from the hire date.
    #[schema(example = 90, nullable = true)]
    pub valid_after_days: Option<i32>,

    #[schema(example = json!(null), nullable = true)]
    pub valid_until_days: Option<i32>,

    #[schema(example = 5, nullable = true)]
    pub borrowable_limit: Option<i32>,

    #[schema(example = 26, nullable = true)]
    pub max_days: Option<i32>,

    #[schema(example = "yearly", nullable = true)]
    pub reset_period: Option<String>,
}
