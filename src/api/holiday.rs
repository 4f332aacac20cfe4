use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct HolidaySet {
    #[schema(example = json!(["2025-01-01", "2025-04-23"]))]
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HolidayCheck {
    #[param(example = "2025-05-01")]
    pub date: NaiveDate,
}

#[utoipa::path(
    get,
    path = "/api/holidays",
    tag = "Holiday",
    responses(
        (status = 200, description = "Configured official holidays, sorted"),
    )
)]
pub async fn holiday_list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({ "dates": state.holidays.snapshot() })))
}

#[utoipa::path(
    put,
    path = "/api/holidays",
    tag = "Holiday",
    request_body = HolidaySet,
    responses(
        (status = 200, description = "Holiday calendar replaced"),
    )
)]
pub async fn replace_holidays(
    state: web::Data<AppState>,
    payload: web::Json<HolidaySet>,
) -> AppResult<HttpResponse> {
    state.holidays.replace(payload.into_inner().dates);
    Ok(HttpResponse::Ok().json(json!({ "dates": state.holidays.snapshot() })))
}

#[utoipa::path(
    get,
    path = "/api/holidays/check",
    tag = "Holiday",
    params(HolidayCheck),
    responses(
        (status = 200, description = "Whether the date is a weekend or official holiday"),
    )
)]
pub async fn check_holiday(
    state: web::Data<AppState>,
    query: web::Query<HolidayCheck>,
) -> AppResult<HttpResponse> {
    let date = query.date;
    Ok(HttpResponse::Ok().json(json!({
        "date": date,
        "is_holiday": state.validator.is_holiday(date),
    })))
}
