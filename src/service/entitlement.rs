//! Entitlement policy: a pure function from (employee, leave type) to the
//! annual allowance. No storage access, no side effects.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, Gender};
use crate::model::leave_type::LeaveType;

const MATERNITY: &str = "maternity leave";
const PATERNITY: &str = "paternity leave";

const MATERNITY_DAYS: i64 = 112;
const PATERNITY_DAYS: i64 = 5;

fn normalized(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Gender-restriction check shared by the validator and the allowance
/// computation. Covers both the explicit `gender_required` flag and the
/// name-keyed maternity/paternity rules.
pub fn check_restriction(employee: &Employee, leave_type: &LeaveType) -> AppResult<()> {
    if let Some(required) = leave_type.gender_required {
        if required != employee.gender {
            return Err(AppError::IneligibleForLeaveType(leave_type.name.clone()));
        }
    }
    match normalized(&leave_type.name).as_str() {
        MATERNITY if employee.gender != Gender::Female => {
            Err(AppError::IneligibleForLeaveType(leave_type.name.clone()))
        }
        PATERNITY if employee.gender != Gender::Male => {
            Err(AppError::IneligibleForLeaveType(leave_type.name.clone()))
        }
        _ => Ok(()),
    }
}

/// Completed years of service, calendar-aware (anniversary not yet reached
/// counts as the previous year).
fn years_of_service(start: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut years = as_of.year() - start.year();
    if (as_of.month(), as_of.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years
}

/// Annual allowance in days for the given employee and leave type.
/// `None` means the type carries no bounded allowance.
///
/// - maternity: fixed 112 days, female employees only
/// - paternity: fixed 5 days, male employees only
/// - annual-leave types: tenure-scaled (<1y: 0, 1-5y: 14, 6-15y: 20, >15y: 26)
/// - everything else: `default_days`, unbounded when absent
pub fn annual_allowance(
    employee: &Employee,
    leave_type: &LeaveType,
    as_of: NaiveDate,
) -> AppResult<Option<Decimal>> {
    check_restriction(employee, leave_type)?;

    match normalized(&leave_type.name).as_str() {
        MATERNITY => Ok(Some(Decimal::from(MATERNITY_DAYS))),
        PATERNITY => Ok(Some(Decimal::from(PATERNITY_DAYS))),
        _ if leave_type.is_annual => {
            let days = match years_of_service(employee.employment_start_date, as_of) {
                1..=5 => 14,
                6..=15 => 20,
                years if years > 15 => 26,
                _ => 0,
            };
            Ok(Some(Decimal::from(days)))
        }
        _ => Ok(leave_type.default_days.map(Decimal::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn employee(gender: Gender, start: NaiveDate) -> Employee {
        Employee {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Test".into(),
            gender,
            employment_start_date: start,
        }
    }

    fn leave_type(name: &str, is_annual: bool, default_days: Option<i32>) -> LeaveType {
        LeaveType {
            id: 2,
            name: name.into(),
            is_annual,
            is_unpaid: false,
            gender_required: None,
            default_days,
            valid_after_days: None,
            valid_until_days: None,
            borrowable_limit: None,
            max_days: None,
            reset_period: None,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn tenure_scaled_annual_allowance() {
        let annual = leave_type("Annual Leave", true, None);
        let as_of = d(2025, 6, 1);

        let seven_years = employee(Gender::Male, d(2018, 3, 1));
        assert_eq!(
            annual_allowance(&seven_years, &annual, as_of).unwrap(),
            Some(dec!(20))
        );

        let rookie = employee(Gender::Female, d(2025, 1, 1));
        assert_eq!(
            annual_allowance(&rookie, &annual, as_of).unwrap(),
            Some(dec!(0))
        );

        let three_years = employee(Gender::Female, d(2022, 6, 1));
        assert_eq!(
            annual_allowance(&three_years, &annual, as_of).unwrap(),
            Some(dec!(14))
        );

        let veteran = employee(Gender::Male, d(2005, 1, 1));
        assert_eq!(
            annual_allowance(&veteran, &annual, as_of).unwrap(),
            Some(dec!(26))
        );
    }

    #[test]
    fn anniversary_boundary_counts_completed_years() {
        let annual = leave_type("Annual Leave", true, None);
        let hired = employee(Gender::Male, d(2019, 6, 15));
        // one day before the 6th anniversary: still 5 completed years
        assert_eq!(
            annual_allowance(&hired, &annual, d(2025, 6, 14)).unwrap(),
            Some(dec!(14))
        );
        assert_eq!(
            annual_allowance(&hired, &annual, d(2025, 6, 15)).unwrap(),
            Some(dec!(20))
        );
    }

    #[test]
    fn maternity_is_fixed_and_female_only() {
        let maternity = leave_type("Maternity Leave", false, None);
        let female = employee(Gender::Female, d(2020, 1, 1));
        let male = employee(Gender::Male, d(2020, 1, 1));

        assert_eq!(
            annual_allowance(&female, &maternity, d(2025, 1, 1)).unwrap(),
            Some(dec!(112))
        );
        assert!(matches!(
            annual_allowance(&male, &maternity, d(2025, 1, 1)),
            Err(AppError::IneligibleForLeaveType(_))
        ));
    }

    #[test]
    fn paternity_is_fixed_and_male_only() {
        let paternity = leave_type("  Paternity Leave ", false, None);
        let male = employee(Gender::Male, d(2020, 1, 1));
        let female = employee(Gender::Female, d(2020, 1, 1));

        assert_eq!(
            annual_allowance(&male, &paternity, d(2025, 1, 1)).unwrap(),
            Some(dec!(5))
        );
        assert!(annual_allowance(&female, &paternity, d(2025, 1, 1)).is_err());
    }

    #[test]
    fn gender_required_flag_is_enforced() {
        let mut restricted = leave_type("Special Leave", false, Some(3));
        restricted.gender_required = Some(Gender::Female);
        let male = employee(Gender::Male, d(2020, 1, 1));

        assert!(matches!(
            check_restriction(&male, &restricted),
            Err(AppError::IneligibleForLeaveType(_))
        ));
    }

    #[test]
    fn other_types_fall_back_to_default_days() {
        let sick = leave_type("Sick Leave", false, Some(10));
        let unlimited = leave_type("Unpaid Leave", false, None);
        let anyone = employee(Gender::Female, d(2020, 1, 1));

        assert_eq!(
            annual_allowance(&anyone, &sick, d(2025, 1, 1)).unwrap(),
            Some(dec!(10))
        );
        assert_eq!(
            annual_allowance(&anyone, &unlimited, d(2025, 1, 1)).unwrap(),
            None
        );
    }
}
