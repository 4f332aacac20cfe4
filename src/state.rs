use std::sync::Arc;

use sqlx::MySqlPool;

use crate::config::Config;
use crate::service::accountant::BalanceAccountant;
use crate::service::holiday::HolidayCalendar;
use crate::service::lifecycle::RequestLifecycle;
use crate::service::validator::RequestValidator;
use crate::store::mysql::{
    MySqlBalanceStore, MySqlEmployeeLookup, MySqlLeaveTypeLookup, MySqlRequestStore,
};
use crate::store::{BalanceStore, LeaveTypeLookup};

/// Shared application state: the wired-up leave engine plus the handles the
/// API layer reads directly.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: RequestLifecycle,
    pub validator: RequestValidator,
    pub holidays: HolidayCalendar,
    pub leave_types: Arc<dyn LeaveTypeLookup>,
    pub balances: Arc<dyn BalanceStore>,
}

impl AppState {
    pub fn new(pool: MySqlPool, config: &Config) -> Self {
        let employees = Arc::new(MySqlEmployeeLookup::new(pool.clone()));
        let leave_types: Arc<dyn LeaveTypeLookup> =
            Arc::new(MySqlLeaveTypeLookup::new(pool.clone()));
        let balances: Arc<dyn BalanceStore> = Arc::new(MySqlBalanceStore::new(pool.clone()));
        let requests = Arc::new(MySqlRequestStore::new(pool));

        let holidays = HolidayCalendar::new(config.official_holidays.iter().copied());
        let accountant = BalanceAccountant::new(balances.clone());
        let validator =
            RequestValidator::new(requests.clone(), balances.clone(), holidays.clone());
        let lifecycle = RequestLifecycle::new(
            employees,
            leave_types.clone(),
            requests,
            accountant,
            validator.clone(),
        );

        Self {
            lifecycle,
            validator,
            holidays,
            leave_types,
            balances,
        }
    }
}
