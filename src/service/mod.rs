//! The leave engine: balance accounting, entitlement policy, request
//! validation and the request state machine. Storage is reached only
//! through the `store` traits.

pub mod accountant;
pub mod entitlement;
pub mod holiday;
pub mod lifecycle;
pub mod validator;
