use crate::api::holiday::HolidaySet;
use crate::api::leave_balance::GrantAllowance;
use crate::api::leave_request::{CreateLeave, StatusChange};
use crate::model::employee::{Employee, Gender};
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::leave_type::LeaveType;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeaveDesk API",
        version = "1.0.0",
        description = r#"
## Employee Leave Accounting System

This API manages employee leave balances and the full lifecycle of
leave requests.

### 🔹 Key Features
- **Leave Requests**
  - Apply for leave, approve/reject/cancel, and search the history
- **Balance Accounting**
  - Oldest-first deduction across periods with carry-over of unused days
- **Entitlement Policy**
  - Tenure-based annual allowances plus gender-restricted leave types
- **Holiday Calendar**
  - Weekend and official-holiday awareness, replaceable at runtime

### 📦 Response Format
- JSON-based RESTful responses
- Errors carry a `message` field describing the failure

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,

        crate::api::leave_balance::get_balance,
        crate::api::leave_balance::balance_list,
        crate::api::leave_balance::grant_allowance,

        crate::api::leave_type::leave_type_list,
        crate::api::leave_type::get_leave_type,

        crate::api::holiday::holiday_list,
        crate::api::holiday::replace_holidays,
        crate::api::holiday::check_holiday
    ),
    components(
        schemas(
            CreateLeave,
            StatusChange,
            LeaveRequest,
            LeaveStatus,
            LeaveBalance,
            GrantAllowance,
            LeaveType,
            Employee,
            Gender,
            HolidaySet
        )
    ),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Balance", description = "Leave balance accounting APIs"),
        (name = "LeaveType", description = "Leave type catalogue APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
    )
)]
pub struct ApiDoc;
