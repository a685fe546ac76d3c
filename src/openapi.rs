use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShiftDesk API",
        version = "1.0.0",
        description = "Multi-location shift scheduling and attendance backend"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Setup
        crate::handlers::setup_handler::run_setup,

        // Auth
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::get_me,
        crate::handlers::auth_handler::change_password,

        // Locations
        crate::handlers::locations_handler::get_locations,
        crate::handlers::locations_handler::get_location,
        crate::handlers::locations_handler::create_location,
        crate::handlers::locations_handler::update_location,
        crate::handlers::locations_handler::delete_location,
        crate::handlers::locations_handler::rotate_clock_token,

        // Positions
        crate::handlers::positions_handler::get_positions,
        crate::handlers::positions_handler::create_position,
        crate::handlers::positions_handler::update_position,
        crate::handlers::positions_handler::delete_position,

        // Users
        crate::handlers::users_handler::get_users,
        crate::handlers::users_handler::get_user,
        crate::handlers::users_handler::create_user,
        crate::handlers::users_handler::update_user,
        crate::handlers::users_handler::delete_user,

        // Shifts
        crate::handlers::shifts_handler::get_shifts,
        crate::handlers::shifts_handler::create_shift,
        crate::handlers::shifts_handler::bulk_create_shifts,
        crate::handlers::shifts_handler::copy_week,
        crate::handlers::shifts_handler::publish_shifts,
        crate::handlers::shifts_handler::update_shift,
        crate::handlers::shifts_handler::claim_shift,
        crate::handlers::shifts_handler::delete_shift,

        // Timesheets
        crate::handlers::timesheets_handler::get_timesheets,
        crate::handlers::timesheets_handler::get_status,
        crate::handlers::timesheets_handler::clock_in,
        crate::handlers::timesheets_handler::clock_out,
        crate::handlers::timesheets_handler::start_break,
        crate::handlers::timesheets_handler::end_break,
        crate::handlers::timesheets_handler::approve_timesheet,
        crate::handlers::timesheets_handler::reject_timesheet,

        // Timeclock (kiosk)
        crate::handlers::timeclock_handler::get_info,
        crate::handlers::timeclock_handler::get_employees,
        crate::handlers::timeclock_handler::verify_pin,
        crate::handlers::timeclock_handler::get_status,
        crate::handlers::timeclock_handler::clock_in,
        crate::handlers::timeclock_handler::clock_out,
        crate::handlers::timeclock_handler::start_break,
        crate::handlers::timeclock_handler::end_break,
        crate::handlers::timeclock_handler::get_today,

        // Time off
        crate::handlers::time_off_handler::get_time_off_requests,
        crate::handlers::time_off_handler::get_pending_count,
        crate::handlers::time_off_handler::create_time_off_request,
        crate::handlers::time_off_handler::approve_time_off,
        crate::handlers::time_off_handler::reject_time_off,
        crate::handlers::time_off_handler::cancel_time_off,

        // Dashboard
        crate::handlers::dashboard_handler::get_overview,
        crate::handlers::dashboard_handler::get_location_range_stats,
        crate::handlers::dashboard_handler::get_today_shifts,
        crate::handlers::dashboard_handler::get_alerts,
    ),
    components(schemas(
        crate::clock::ClockState,
        crate::models::company::Company,
        crate::models::company_input::SetupInput,
        crate::models::company_input::SetupResponse,
        crate::models::dashboard::AlertItem,
        crate::models::dashboard::DashboardOverview,
        crate::models::dashboard::LocationOverview,
        crate::models::dashboard::LocationRangeStats,
        crate::models::dashboard::LocationStats,
        crate::models::dashboard::PositionStat,
        crate::models::dashboard::TodayShiftsGroup,
        crate::models::dashboard::TodayShiftsLocation,
        crate::models::location::Location,
        crate::models::location_input::CreateLocationInput,
        crate::models::location_input::UpdateLocationInput,
        crate::models::position::Position,
        crate::models::position_input::CreatePositionInput,
        crate::models::position_input::UpdatePositionInput,
        crate::models::shift::DayOffType,
        crate::models::shift::Shift,
        crate::models::shift::ShiftStatus,
        crate::models::shift::ShiftWithDetails,
        crate::models::shift_input::BulkCreateShiftsInput,
        crate::models::shift_input::BulkShiftsResponse,
        crate::models::shift_input::CopyWeekInput,
        crate::models::shift_input::CreateShiftInput,
        crate::models::shift_input::PublishShiftsInput,
        crate::models::shift_input::ShiftCountResponse,
        crate::models::shift_input::UpdateShiftInput,
        crate::models::time_off::TimeOffRequest,
        crate::models::time_off::TimeOffStatus,
        crate::models::time_off::TimeOffWithUser,
        crate::models::time_off_input::CreateTimeOffInput,
        crate::models::time_off_input::CreateTimeOffResponse,
        crate::models::time_off_input::PendingCountResponse,
        crate::models::time_off_input::RejectTimeOffInput,
        crate::models::timeclock_input::KioskActionInput,
        crate::models::timeclock_input::KioskActionResponse,
        crate::models::timeclock_input::KioskEmployee,
        crate::models::timeclock_input::KioskLocationInfo,
        crate::models::timeclock_input::KioskStatusResponse,
        crate::models::timeclock_input::KioskTodayEntry,
        crate::models::timeclock_input::VerifyPinInput,
        crate::models::timeclock_input::VerifyPinResponse,
        crate::models::timesheet::Timesheet,
        crate::models::timesheet::TimesheetStatus,
        crate::models::timesheet::TimesheetWithDetails,
        crate::models::timesheet_input::ClockInInput,
        crate::models::timesheet_input::RejectTimesheetInput,
        crate::models::timesheet_input::TimesheetStatusResponse,
        crate::models::user::User,
        crate::models::user::UserLocationEntry,
        crate::models::user::UserPositionEntry,
        crate::models::user::UserRole,
        crate::models::user::UserWithAssignments,
        crate::models::user_input::ChangePasswordInput,
        crate::models::user_input::CreateUserInput,
        crate::models::user_input::LoginInput,
        crate::models::user_input::LoginResponse,
        crate::models::user_input::SuccessResponse,
        crate::models::user_input::UpdateUserInput,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login and account self-service"),
        (name = "setup", description = "One-time bootstrap"),
        (name = "locations", description = "Branch management"),
        (name = "positions", description = "Job role management"),
        (name = "users", description = "Workforce management"),
        (name = "shifts", description = "Scheduling"),
        (name = "timesheets", description = "Self-service attendance"),
        (name = "timeclock", description = "Kiosk attendance"),
        (name = "time-off", description = "Absence requests"),
        (name = "dashboard", description = "Read-only rollups"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
