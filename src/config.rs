use chrono::NaiveDate;
use dotenvy::dotenv;
use std::env;

const DEFAULT_OFFICIAL_HOLIDAYS: &str =
    "2025-01-01,2025-04-23,2025-05-01,2025-05-19,2025-07-15,2025-08-30,2025-10-29";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub official_holidays: Vec<NaiveDate>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            official_holidays: env::var("OFFICIAL_HOLIDAYS")
                .unwrap_or_else(|_| DEFAULT_OFFICIAL_HOLIDAYS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse()
                        .unwrap_or_else(|_| panic!("OFFICIAL_HOLIDAYS: bad date {s:?}"))
                })
                .collect(),
        }
    }
}
