use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Employee gender, stored as a lowercase string. Parsing is strict: an
/// unrecognized value is an error, never a silent default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sqlx(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value.trim())
            .map_err(|_| AppError::InvalidInput(format!("unknown gender: {value}")))
    }
}

/// Fully-resolved employee snapshot handed to the core by the lookup
/// collaborator. No live references, no fetch-on-access.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "first_name": "John",
    "last_name": "Doe",
    "gender": "male",
    "employment_start_date": "2018-04-01"
}))]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "male")]
    pub gender: Gender,

    #[schema(example = "2018-04-01", value_type = String, format = "date")]
    pub employment_start_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parse_is_strict() {
        assert_eq!(Gender::parse("male").unwrap(), Gender::Male);
        assert_eq!(Gender::parse(" female ").unwrap(), Gender::Female);
        assert!(matches!(
            Gender::parse("other"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(Gender::parse("").is_err());
    }

    #[test]
    fn gender_round_trips_through_display() {
        assert_eq!(Gender::Male.to_string(), "male");
        assert_eq!(
            Gender::parse(&Gender::Female.to_string()).unwrap(),
            Gender::Female
        );
    }
}
