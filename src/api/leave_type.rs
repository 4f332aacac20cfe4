use actix_web::{HttpResponse, web};

use crate::error::AppResult;
use crate::model::leave_type::LeaveType;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/leave-type",
    tag = "LeaveType",
    responses(
        (status = 200, description = "All configured leave types", body = [LeaveType]),
    )
)]
pub async fn leave_type_list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let types = state.leave_types.list().await?;
    Ok(HttpResponse::Ok().json(types))
}

#[utoipa::path(
    get,
    path = "/api/leave-type/{id}",
    tag = "LeaveType",
    params(("id" = u64, Path, description = "Leave type id")),
    responses(
        (status = 200, description = "Leave type", body = LeaveType),
        (status = 404, description = "Leave type not found"),
    )
)]
pub async fn get_leave_type(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    let leave_type = state.leave_types.find_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave_type))
}
