pub mod company;
pub mod company_input;
pub mod dashboard;
pub mod location;
pub mod location_input;
pub mod position;
pub mod position_input;
pub mod shift;
pub mod shift_input;
pub mod time_off;
pub mod time_off_input;
pub mod timeclock_input;
pub mod timesheet;
pub mod timesheet_input;
pub mod user;
pub mod user_input;

pub use company::Company;
pub use company_input::{SetupInput, SetupResponse};
pub use dashboard::{
    AlertItem, DashboardOverview, LocationOverview, LocationRangeStats, LocationStats,
    PositionStat, TodayShiftsGroup, TodayShiftsLocation,
};
pub use location::Location;
pub use location_input::{CreateLocationInput, UpdateLocationInput};
pub use position::Position;
pub use position_input::{CreatePositionInput, UpdatePositionInput};
pub use shift::{
    accepts_attendance, apply_update, normalize_draft, DayOffType, Shift, ShiftDraft, ShiftPatch,
    ShiftStatus, ShiftWithDetails,
};
pub use shift_input::{
    BulkCreateShiftsInput, BulkShiftsResponse, CopyWeekInput, CreateShiftInput,
    PublishShiftsInput, ShiftCountResponse, UpdateShiftInput,
};
pub use time_off::{TimeOffRequest, TimeOffStatus, TimeOffWithUser};
pub use time_off_input::{
    CreateTimeOffInput, CreateTimeOffResponse, PendingCountResponse, RejectTimeOffInput,
};
pub use timeclock_input::{
    KioskActionInput, KioskActionResponse, KioskEmployee, KioskLocationInfo, KioskStatusResponse,
    KioskTodayEntry, VerifyPinInput, VerifyPinResponse,
};
pub use timesheet::{Timesheet, TimesheetStatus, TimesheetWithDetails};
pub use timesheet_input::{ClockInInput, RejectTimesheetInput, TimesheetStatusResponse};
pub use user::{User, UserLocationEntry, UserPositionEntry, UserRole, UserWithAssignments};
pub use user_input::{
    ChangePasswordInput, CreateUserInput, LoginInput, LoginResponse, SuccessResponse,
    UpdateUserInput,
};
