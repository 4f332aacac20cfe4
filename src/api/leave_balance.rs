use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::model::leave_balance::LeaveBalance;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceQuery {
    #[param(example = 42)]
    pub employee_id: u64,
    #[param(example = 1)]
    pub leave_type_id: u64,
    #[param(example = 2025)]
    pub year: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceListQuery {
    #[param(example = 42)]
    pub employee_id: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantAllowance {
    #[schema(example = 42)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = 2025)]
    pub year: i32,
}

#[utoipa::path(
    get,
    path = "/api/balance",
    tag = "Balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Available days for the period, carry-over included"),
        (status = 400, description = "Invalid balance data"),
    )
)]
pub async fn get_balance(
    state: web::Data<AppState>,
    query: web::Query<BalanceQuery>,
) -> AppResult<HttpResponse> {
    let available = state
        .lifecycle
        .available_balance(query.employee_id, query.leave_type_id, query.year)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "available": available })))
}

#[utoipa::path(
    get,
    path = "/api/balance/list",
    tag = "Balance",
    params(BalanceListQuery),
    responses(
        (status = 200, description = "All balance rows of the employee, oldest first", body = [LeaveBalance]),
    )
)]
pub async fn balance_list(
    state: web::Data<AppState>,
    query: web::Query<BalanceListQuery>,
) -> AppResult<HttpResponse> {
    let rows = state.balances.find_by_employee(query.employee_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/balance/grant",
    tag = "Balance",
    request_body = GrantAllowance,
    responses(
        (status = 201, description = "Allowance granted", body = LeaveBalance),
        (status = 400, description = "No allowance defined for the leave type"),
        (status = 404, description = "Employee or leave type not found"),
        (status = 409, description = "Period already granted"),
    )
)]
pub async fn grant_allowance(
    state: web::Data<AppState>,
    payload: web::Json<GrantAllowance>,
) -> AppResult<HttpResponse> {
    let body = payload.into_inner();
    let granted = state
        .lifecycle
        .grant_annual_allowance(body.employee_id, body.leave_type_id, body.year)
        .await?;
    Ok(HttpResponse::Created().json(granted))
}
