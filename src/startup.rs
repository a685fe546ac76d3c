use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{handlers, middleware, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .frontend_url
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/login", post(handlers::auth_handler::login))
        .route("/me", get(handlers::auth_handler::get_me))
        .route(
            "/change-password",
            post(handlers::auth_handler::change_password),
        );

    let location_routes = Router::new()
        .route("/", get(handlers::locations_handler::get_locations))
        .route("/", post(handlers::locations_handler::create_location))
        .route("/{id}", get(handlers::locations_handler::get_location))
        .route("/{id}", put(handlers::locations_handler::update_location))
        .route("/{id}", delete(handlers::locations_handler::delete_location))
        .route(
            "/{id}/rotate-token",
            post(handlers::locations_handler::rotate_clock_token),
        );

    let position_routes = Router::new()
        .route("/", get(handlers::positions_handler::get_positions))
        .route("/", post(handlers::positions_handler::create_position))
        .route("/{id}", put(handlers::positions_handler::update_position))
        .route("/{id}", delete(handlers::positions_handler::delete_position));

    let user_routes = Router::new()
        .route("/", get(handlers::users_handler::get_users))
        .route("/", post(handlers::users_handler::create_user))
        .route("/{id}", get(handlers::users_handler::get_user))
        .route("/{id}", put(handlers::users_handler::update_user))
        .route("/{id}", delete(handlers::users_handler::delete_user));

    let shift_routes = Router::new()
        .route("/", get(handlers::shifts_handler::get_shifts))
        .route("/", post(handlers::shifts_handler::create_shift))
        .route("/bulk", post(handlers::shifts_handler::bulk_create_shifts))
        .route("/copy-week", post(handlers::shifts_handler::copy_week))
        .route("/publish", post(handlers::shifts_handler::publish_shifts))
        .route("/{id}", put(handlers::shifts_handler::update_shift))
        .route("/{id}", delete(handlers::shifts_handler::delete_shift))
        .route("/{id}/claim", post(handlers::shifts_handler::claim_shift));

    let timesheet_routes = Router::new()
        .route("/", get(handlers::timesheets_handler::get_timesheets))
        .route("/status", get(handlers::timesheets_handler::get_status))
        .route("/clock-in", post(handlers::timesheets_handler::clock_in))
        .route("/clock-out", post(handlers::timesheets_handler::clock_out))
        .route(
            "/break/start",
            post(handlers::timesheets_handler::start_break),
        )
        .route("/break/end", post(handlers::timesheets_handler::end_break))
        .route(
            "/{id}/approve",
            post(handlers::timesheets_handler::approve_timesheet),
        )
        .route(
            "/{id}/reject",
            post(handlers::timesheets_handler::reject_timesheet),
        );

    // Kiosk surface: gated by the location token, not by login
    let timeclock_routes = Router::new()
        .route("/{token}/info", get(handlers::timeclock_handler::get_info))
        .route(
            "/{token}/employees",
            get(handlers::timeclock_handler::get_employees),
        )
        .route(
            "/{token}/verify-pin",
            post(handlers::timeclock_handler::verify_pin),
        )
        .route(
            "/{token}/status/{employee_id}",
            get(handlers::timeclock_handler::get_status),
        )
        .route(
            "/{token}/clock-in",
            post(handlers::timeclock_handler::clock_in),
        )
        .route(
            "/{token}/clock-out",
            post(handlers::timeclock_handler::clock_out),
        )
        .route(
            "/{token}/break-start",
            post(handlers::timeclock_handler::start_break),
        )
        .route(
            "/{token}/break-end",
            post(handlers::timeclock_handler::end_break),
        )
        .route("/{token}/today", get(handlers::timeclock_handler::get_today));

    let time_off_routes = Router::new()
        .route("/", get(handlers::time_off_handler::get_time_off_requests))
        .route("/", post(handlers::time_off_handler::create_time_off_request))
        .route(
            "/pending-count",
            get(handlers::time_off_handler::get_pending_count),
        )
        .route(
            "/{id}/approve",
            post(handlers::time_off_handler::approve_time_off),
        )
        .route(
            "/{id}/reject",
            post(handlers::time_off_handler::reject_time_off),
        )
        .route(
            "/{id}/cancel",
            post(handlers::time_off_handler::cancel_time_off),
        );

    let dashboard_routes = Router::new()
        .route("/overview", get(handlers::dashboard_handler::get_overview))
        .route(
            "/location/{id}/stats",
            get(handlers::dashboard_handler::get_location_range_stats),
        )
        .route(
            "/today-shifts",
            get(handlers::dashboard_handler::get_today_shifts),
        )
        .route("/alerts", get(handlers::dashboard_handler::get_alerts));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/setup", post(handlers::setup_handler::run_setup))
        .nest("/api/auth", auth_routes)
        .nest("/api/locations", location_routes)
        .nest("/api/positions", position_routes)
        .nest("/api/users", user_routes)
        .nest("/api/shifts", shift_routes)
        .nest("/api/timesheets", timesheet_routes)
        .nest("/api/timeclock", timeclock_routes)
        .nest("/api/time-off", time_off_routes)
        .nest("/api/dashboard", dashboard_routes)
        .merge(Scalar::with_url("/api-docs", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn(middleware::metrics_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
