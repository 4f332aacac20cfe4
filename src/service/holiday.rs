use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

/// Administratively-defined holiday dates, injected at startup from config
/// and replaceable at runtime without a redeploy. Weekends are handled by
/// the validator, not stored here.
#[derive(Clone, Default)]
pub struct HolidayCalendar {
    dates: Arc<RwLock<HashSet<NaiveDate>>>,
}

impl HolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: Arc::new(RwLock::new(dates.into_iter().collect())),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&date)
    }

    /// Swap the whole set; readers see the new calendar on their next check.
    pub fn replace(&self, dates: Vec<NaiveDate>) {
        *self.dates.write().unwrap_or_else(|e| e.into_inner()) = dates.into_iter().collect();
    }

    pub fn snapshot(&self) -> Vec<NaiveDate> {
        let mut all: Vec<NaiveDate> = self
            .dates
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .copied()
            .collect();
        all.sort();
        all
    }
}
