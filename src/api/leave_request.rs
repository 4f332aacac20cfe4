use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::state::AppState;
use crate::store::RequestFilter;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 42)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "2025-06-02")]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-06")]
    pub end_date: NaiveDate,
    #[schema(example = "Family visit")]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StatusChange {
    #[schema(example = 7)]
    pub approver_id: Option<u64>,
    #[schema(example = "Approved per team schedule")]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaveFilter {
    pub employee_id: Option<u64>,
    /// One of: pending, approved, rejected, cancelled
    pub status: Option<String>,
    pub approved_by: Option<u64>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
    pub cancelled: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/api/leave",
    tag = "Leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Invalid date range or input"),
        (status = 404, description = "Employee or leave type not found"),
        (status = 409, description = "Overlapping request exists"),
        (status = 422, description = "Ineligible or insufficient balance"),
    )
)]
pub async fn create_leave(
    state: web::Data<AppState>,
    payload: web::Json<CreateLeave>,
) -> AppResult<HttpResponse> {
    let body = payload.into_inner();
    let created = state
        .lifecycle
        .create(
            body.employee_id,
            body.leave_type_id,
            body.start_date,
            body.end_date,
            body.reason,
        )
        .await?;
    Ok(HttpResponse::Created().json(created))
}

async fn change_status(
    state: &AppState,
    id: u64,
    new_status: LeaveStatus,
    payload: Option<web::Json<StatusChange>>,
) -> AppResult<HttpResponse> {
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let updated = state
        .lifecycle
        .change_status(id, new_status, body.approver_id, body.note)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    tag = "Leave",
    params(("id" = u64, Path, description = "Leave request id")),
    request_body = Option<StatusChange>,
    responses(
        (status = 200, description = "Request approved", body = LeaveRequest),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Transition not allowed"),
    )
)]
pub async fn approve_leave(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: Option<web::Json<StatusChange>>,
) -> AppResult<HttpResponse> {
    change_status(&state, path.into_inner(), LeaveStatus::Approved, payload).await
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    tag = "Leave",
    params(("id" = u64, Path, description = "Leave request id")),
    request_body = Option<StatusChange>,
    responses(
        (status = 200, description = "Request rejected, reserved days restored", body = LeaveRequest),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Transition not allowed"),
    )
)]
pub async fn reject_leave(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: Option<web::Json<StatusChange>>,
) -> AppResult<HttpResponse> {
    change_status(&state, path.into_inner(), LeaveStatus::Rejected, payload).await
}

#[utoipa::path(
    put,
    path = "/api/leave/{id}/cancel",
    tag = "Leave",
    params(("id" = u64, Path, description = "Leave request id")),
    request_body = Option<StatusChange>,
    responses(
        (status = 200, description = "Request cancelled, reserved days restored", body = LeaveRequest),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Transition not allowed"),
    )
)]
pub async fn cancel_leave(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: Option<web::Json<StatusChange>>,
) -> AppResult<HttpResponse> {
    change_status(&state, path.into_inner(), LeaveStatus::Cancelled, payload).await
}

#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    tag = "Leave",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave request", body = LeaveRequest),
        (status = 404, description = "Request not found"),
    )
)]
pub async fn get_leave(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let request = state.lifecycle.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    get,
    path = "/api/leave",
    tag = "Leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Matching leave requests", body = [LeaveRequest]),
        (status = 400, description = "Unknown status value"),
    )
)]
pub async fn leave_list(
    state: web::Data<AppState>,
    query: web::Query<LeaveFilter>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let status = query.status.as_deref().map(LeaveStatus::parse).transpose()?;
    let filter = RequestFilter {
        employee_id: query.employee_id,
        status,
        approved_by: query.approved_by,
        start_from: query.start_from,
        start_to: query.start_to,
        cancelled: query.cancelled,
    };
    let requests = state.lifecycle.search(&filter).await?;
    Ok(HttpResponse::Ok().json(requests))
}
