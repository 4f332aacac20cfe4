pub mod holiday;
pub mod leave_balance;
pub mod leave_request;
pub mod leave_type;
