use crate::api::{holiday, leave_balance, leave_request, leave_type};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    // /leave/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/balance")
                    // /balance
                    .service(web::resource("").route(web::get().to(leave_balance::get_balance)))
                    // /balance/list
                    .service(
                        web::resource("/list").route(web::get().to(leave_balance::balance_list)),
                    )
                    // /balance/grant
                    .service(
                        web::resource("/grant")
                            .route(web::post().to(leave_balance::grant_allowance)),
                    ),
            )
            .service(
                web::scope("/leave-type")
                    // /leave-type
                    .service(
                        web::resource("").route(web::get().to(leave_type::leave_type_list)),
                    )
                    // /leave-type/{id}
                    .service(
                        web::resource("/{id}").route(web::get().to(leave_type::get_leave_type)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    // /holidays
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::holiday_list))
                            .route(web::put().to(holiday::replace_holidays)),
                    )
                    // /holidays/check
                    .service(
                        web::resource("/check").route(web::get().to(holiday::check_holiday)),
                    ),
            ),
    );
}
