use crate::{
    api::{attendance, leave_request, master_data, reports, users},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_limiter))
                    .route(web::post().to(handlers::register)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/attendance")
                    // literal segments must register before /{id}
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/my-history").route(web::get().to(attendance::my_history)),
                    )
                    .service(
                        web::resource("/absent").route(web::post().to(attendance::record_absence)),
                    )
                    .service(
                        web::resource("/monthly-report")
                            .route(web::get().to(attendance::monthly_report)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}").route(web::put().to(attendance::update_attendance)),
                    ),
            )
            .service(
                web::scope("/students")
                    // /students/{id}/attendance
                    .service(
                        web::resource("/{id}/attendance")
                            .route(web::get().to(attendance::student_history)),
                    ),
            )
            .service(
                web::scope("/leaves")
                    // /leaves
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::list_leaves))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    .service(
                        web::resource("/my-history").route(web::get().to(leave_request::my_leaves)),
                    )
                    // /leaves/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(leave_request::update_leave_status)),
                    )
                    // /leaves/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(leave_request::delete_leave)),
                    ),
            )
            .service(
                web::scope("/users")
                    // /users
                    .service(
                        web::resource("")
                            .route(web::post().to(users::create_user))
                            .route(web::get().to(users::list_users)),
                    )
                    // /users/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(users::get_user))
                            .route(web::put().to(users::update_user))
                            .route(web::delete().to(users::delete_user)),
                    ),
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(users::get_profile))
                    .route(web::put().to(users::update_profile)),
            )
            .service(
                web::scope("/departments")
                    .service(
                        web::resource("")
                            .route(web::post().to(master_data::create_department))
                            .route(web::get().to(master_data::list_departments)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(master_data::update_department))
                            .route(web::delete().to(master_data::delete_department)),
                    ),
            )
            .service(
                web::scope("/locations")
                    .service(
                        web::resource("")
                            .route(web::post().to(master_data::create_location))
                            .route(web::get().to(master_data::list_locations)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(master_data::update_location))
                            .route(web::delete().to(master_data::delete_location)),
                    ),
            )
            .service(
                web::scope("/sakas")
                    .service(
                        web::resource("")
                            .route(web::post().to(master_data::create_saka))
                            .route(web::get().to(master_data::list_sakas)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(master_data::update_saka))
                            .route(web::delete().to(master_data::delete_saka)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(web::resource("/dashboard").route(web::get().to(reports::dashboard)))
                    .service(
                        web::resource("/attendance-summary")
                            .route(web::get().to(reports::attendance_summary)),
                    )
                    .service(
                        web::resource("/monthly-trends")
                            .route(web::get().to(reports::monthly_trends)),
                    )
                    .service(
                        web::resource("/student-stats")
                            .route(web::get().to(reports::student_stats)),
                    ),
            ),
    );
}
