use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::calendar;
use crate::models::shift_input::{CreateShiftInput, UpdateShiftInput};
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "shift_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "day_off_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOffType {
    DayOff,
    Vacation,
    Sick,
    Personal,
    Holiday,
    UnpaidLeave,
    Other,
}

/// A scheduled unit of work, or a day-off marker when `is_day_off` is set.
///
/// A day-off record always carries null position and times and zero break;
/// an open shift (`is_open_shift`) always carries a null `user_id`. Both
/// rules are enforced by [`normalize_draft`] and [`apply_update`], never
/// left to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Shift {
    pub id: Uuid,
    pub location_id: Uuid,
    pub user_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_minutes: i32,
    pub notes: Option<String>,
    pub status: ShiftStatus,
    pub is_open_shift: bool,
    pub is_published: bool,
    pub is_day_off: bool,
    pub day_off_type: Option<DayOffType>,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shift plus display fields joined from location, user and position.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ShiftWithDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub shift: Shift,
    pub location_name: String,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_avatar: Option<String>,
    pub position_name: Option<String>,
    pub position_color: Option<String>,
}

/// A validated, normalized field set ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftDraft {
    pub location_id: Uuid,
    pub user_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_minutes: i32,
    pub notes: Option<String>,
    pub is_open_shift: bool,
    pub is_day_off: bool,
    pub day_off_type: Option<DayOffType>,
    pub is_paid: bool,
}

/// Validate a creation input and apply the day-off/open-shift rules.
///
/// A day-off drops position, times and break and defaults its type to
/// DAY_OFF. A work shift requires position and both times, and an open
/// shift forces `user_id` to null no matter what was submitted.
pub fn normalize_draft(input: CreateShiftInput) -> Result<ShiftDraft, AppError> {
    let date = calendar::parse_date(&input.date)?;
    let is_paid = input.is_paid.unwrap_or(true);

    if input.is_day_off.unwrap_or(false) {
        return Ok(ShiftDraft {
            location_id: input.location_id,
            user_id: input.user_id,
            position_id: None,
            date,
            start_time: None,
            end_time: None,
            break_minutes: 0,
            notes: input.notes,
            is_open_shift: false,
            is_day_off: true,
            day_off_type: Some(input.day_off_type.unwrap_or(DayOffType::DayOff)),
            is_paid,
        });
    }

    let position_id = input
        .position_id
        .ok_or_else(|| AppError::Validation("Position is required for work shifts".to_string()))?;
    let start_time = input
        .start_time
        .as_deref()
        .ok_or_else(|| AppError::Validation("Start time is required for work shifts".to_string()))
        .and_then(calendar::parse_time)?;
    let end_time = input
        .end_time
        .as_deref()
        .ok_or_else(|| AppError::Validation("End time is required for work shifts".to_string()))
        .and_then(calendar::parse_time)?;
    let break_minutes = input.break_minutes.unwrap_or(0);
    if break_minutes < 0 {
        return Err(AppError::Validation(
            "Break minutes cannot be negative".to_string(),
        ));
    }
    let is_open_shift = input.is_open_shift.unwrap_or(false);
    let user_id = if is_open_shift { None } else { input.user_id };

    Ok(ShiftDraft {
        location_id: input.location_id,
        user_id,
        position_id: Some(position_id),
        date,
        start_time: Some(start_time),
        end_time: Some(end_time),
        break_minutes,
        notes: input.notes,
        is_open_shift,
        is_day_off: false,
        day_off_type: None,
        is_paid,
    })
}

/// Whether attendance may link to this shift.
///
/// Day-offs have no working hours, and a cancelled shift stays cancelled:
/// linking would flip it back to IN_PROGRESS on clock-in.
pub fn accepts_attendance(status: ShiftStatus, is_day_off: bool) -> bool {
    !is_day_off && status != ShiftStatus::Cancelled
}

/// The complete mutable column set resulting from a partial update.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftPatch {
    pub user_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_minutes: i32,
    pub notes: Option<String>,
    pub status: ShiftStatus,
    pub is_open_shift: bool,
    pub is_published: bool,
    pub is_day_off: bool,
    pub day_off_type: Option<DayOffType>,
    pub is_paid: bool,
}

/// Merge a partial update into the current record, applying the same
/// day-off/open-shift rules as [`normalize_draft`] incrementally.
///
/// Toggling `is_day_off` on nulls out position, times and break in the
/// same operation; toggling it off clears the day-off type. A record whose
/// final state is an open shift ends with a null `user_id` even when the
/// input never mentions the worker.
pub fn apply_update(current: &Shift, input: UpdateShiftInput) -> Result<ShiftPatch, AppError> {
    let date = match input.date.as_deref() {
        Some(s) => calendar::parse_date(s)?,
        None => current.date,
    };
    let is_day_off = input.is_day_off.unwrap_or(current.is_day_off);

    let (position_id, start_time, end_time, break_minutes, is_open_shift, day_off_type);
    if is_day_off {
        position_id = None;
        start_time = None;
        end_time = None;
        break_minutes = 0;
        is_open_shift = false;
        day_off_type = Some(
            input
                .day_off_type
                .or(current.day_off_type)
                .unwrap_or(DayOffType::DayOff),
        );
    } else {
        position_id = input.position_id.or(current.position_id);
        start_time = match input.start_time.as_deref() {
            Some(s) => Some(calendar::parse_time(s)?),
            None => current.start_time,
        };
        end_time = match input.end_time.as_deref() {
            Some(s) => Some(calendar::parse_time(s)?),
            None => current.end_time,
        };
        break_minutes = input.break_minutes.unwrap_or(current.break_minutes);
        if break_minutes < 0 {
            return Err(AppError::Validation(
                "Break minutes cannot be negative".to_string(),
            ));
        }
        is_open_shift = input.is_open_shift.unwrap_or(current.is_open_shift);
        day_off_type = None;
    }

    let user_id = if is_open_shift {
        None
    } else {
        input.user_id.or(current.user_id)
    };

    Ok(ShiftPatch {
        user_id,
        position_id,
        date,
        start_time,
        end_time,
        break_minutes,
        notes: input.notes.or_else(|| current.notes.clone()),
        status: input.status.unwrap_or(current.status),
        is_open_shift,
        is_published: input.is_published.unwrap_or(current.is_published),
        is_day_off,
        day_off_type,
        is_paid: input.is_paid.unwrap_or(current.is_paid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> CreateShiftInput {
        CreateShiftInput {
            location_id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            position_id: Some(Uuid::new_v4()),
            date: "2024-06-10".to_string(),
            start_time: Some("09:00".to_string()),
            end_time: Some("17:00".to_string()),
            break_minutes: Some(30),
            notes: None,
            is_open_shift: None,
            is_day_off: None,
            day_off_type: None,
            is_paid: None,
        }
    }

    fn existing_shift() -> Shift {
        Shift {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            position_id: Some(Uuid::new_v4()),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
            break_minutes: 30,
            notes: Some("front desk".to_string()),
            status: ShiftStatus::Scheduled,
            is_open_shift: false,
            is_published: true,
            is_day_off: false,
            day_off_type: None,
            is_paid: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_work_shift() {
        let input = base_input();
        let user_id = input.user_id;

        let draft = normalize_draft(input).unwrap();

        assert_eq!(draft.user_id, user_id);
        assert_eq!(draft.start_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(draft.break_minutes, 30);
        assert!(!draft.is_day_off);
        assert_eq!(draft.day_off_type, None);
    }

    #[test]
    fn test_normalize_day_off_drops_work_fields() {
        let mut input = base_input();
        input.is_day_off = Some(true);
        input.is_open_shift = Some(true);

        let draft = normalize_draft(input).unwrap();

        assert!(draft.is_day_off);
        assert_eq!(draft.position_id, None);
        assert_eq!(draft.start_time, None);
        assert_eq!(draft.end_time, None);
        assert_eq!(draft.break_minutes, 0);
        assert!(!draft.is_open_shift);
        assert_eq!(draft.day_off_type, Some(DayOffType::DayOff));
        assert!(draft.user_id.is_some());
    }

    #[test]
    fn test_normalize_day_off_keeps_explicit_type() {
        let mut input = base_input();
        input.is_day_off = Some(true);
        input.day_off_type = Some(DayOffType::Vacation);

        let draft = normalize_draft(input).unwrap();
        assert_eq!(draft.day_off_type, Some(DayOffType::Vacation));
    }

    #[test]
    fn test_normalize_open_shift_forces_null_user() {
        let mut input = base_input();
        input.is_open_shift = Some(true);

        let draft = normalize_draft(input).unwrap();

        assert!(draft.is_open_shift);
        assert_eq!(draft.user_id, None);
    }

    #[test]
    fn test_normalize_work_shift_requires_times_and_position() {
        let mut input = base_input();
        input.start_time = None;
        assert!(matches!(
            normalize_draft(input),
            Err(AppError::Validation(_))
        ));

        let mut input = base_input();
        input.position_id = None;
        assert!(matches!(
            normalize_draft(input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_malformed_date() {
        let mut input = base_input();
        input.date = "2024-6-10".to_string();
        assert!(matches!(
            normalize_draft(input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_negative_break() {
        let mut input = base_input();
        input.break_minutes = Some(-15);
        assert!(matches!(
            normalize_draft(input),
            Err(AppError::Validation(_))
        ));
    }

    fn empty_update() -> UpdateShiftInput {
        UpdateShiftInput {
            user_id: None,
            position_id: None,
            date: None,
            start_time: None,
            end_time: None,
            break_minutes: None,
            notes: None,
            status: None,
            is_open_shift: None,
            is_published: None,
            is_day_off: None,
            day_off_type: None,
            is_paid: None,
        }
    }

    #[test]
    fn test_update_keeps_unmentioned_fields() {
        let current = existing_shift();
        let patch = apply_update(&current, empty_update()).unwrap();

        assert_eq!(patch.user_id, current.user_id);
        assert_eq!(patch.position_id, current.position_id);
        assert_eq!(patch.date, current.date);
        assert_eq!(patch.start_time, current.start_time);
        assert_eq!(patch.break_minutes, current.break_minutes);
        assert_eq!(patch.status, current.status);
        assert_eq!(patch.is_published, current.is_published);
        assert_eq!(patch.notes, current.notes);
    }

    #[test]
    fn test_update_toggle_day_off_on_clears_work_fields() {
        let current = existing_shift();
        let mut input = empty_update();
        input.is_day_off = Some(true);

        let patch = apply_update(&current, input).unwrap();

        assert!(patch.is_day_off);
        assert_eq!(patch.position_id, None);
        assert_eq!(patch.start_time, None);
        assert_eq!(patch.end_time, None);
        assert_eq!(patch.break_minutes, 0);
        assert!(!patch.is_open_shift);
        assert_eq!(patch.day_off_type, Some(DayOffType::DayOff));
    }

    #[test]
    fn test_update_toggle_day_off_off_clears_type() {
        let mut current = existing_shift();
        current.is_day_off = true;
        current.day_off_type = Some(DayOffType::Sick);
        current.position_id = None;
        current.start_time = None;
        current.end_time = None;
        current.break_minutes = 0;

        let mut input = empty_update();
        input.is_day_off = Some(false);
        input.start_time = Some("10:00".to_string());
        input.end_time = Some("18:00".to_string());

        let patch = apply_update(&current, input).unwrap();

        assert!(!patch.is_day_off);
        assert_eq!(patch.day_off_type, None);
        assert_eq!(patch.start_time, NaiveTime::from_hms_opt(10, 0, 0));
    }

    #[test]
    fn test_update_opening_shift_unassigns_worker() {
        let current = existing_shift();
        let mut input = empty_update();
        input.is_open_shift = Some(true);

        let patch = apply_update(&current, input).unwrap();

        assert!(patch.is_open_shift);
        assert_eq!(patch.user_id, None);
    }

    #[test]
    fn test_update_day_off_ignores_submitted_times() {
        let mut current = existing_shift();
        current.is_day_off = true;
        current.day_off_type = Some(DayOffType::Vacation);
        current.position_id = None;
        current.start_time = None;
        current.end_time = None;
        current.break_minutes = 0;

        let mut input = empty_update();
        input.start_time = Some("08:00".to_string());
        input.break_minutes = Some(45);

        let patch = apply_update(&current, input).unwrap();

        assert_eq!(patch.start_time, None);
        assert_eq!(patch.break_minutes, 0);
        assert_eq!(patch.day_off_type, Some(DayOffType::Vacation));
    }

    #[test]
    fn test_update_rejects_malformed_date() {
        let current = existing_shift();
        let mut input = empty_update();
        input.date = Some("06/10/2024".to_string());

        assert!(matches!(
            apply_update(&current, input),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_cancelled_shift_rejects_attendance() {
        assert!(!accepts_attendance(ShiftStatus::Cancelled, false));
        assert!(!accepts_attendance(ShiftStatus::Scheduled, true));

        assert!(accepts_attendance(ShiftStatus::Scheduled, false));
        assert!(accepts_attendance(ShiftStatus::InProgress, false));
        assert!(accepts_attendance(ShiftStatus::Completed, false));
    }
}
