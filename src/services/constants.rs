//! Centralized scheduling constants, grounded in `const.py`. Referenced
//! by the phase handlers in `services::phases`; never re-derived at the
//! call site.

/// Days from `start_date` at which `FUTURE_SELF_SHORT` is planned.
pub const FUTURE_SELF_INTRO: i64 = 8;
/// Days from `start_date` at which `GOAL_SETTING` is due.
pub const GOAL_SETTING: i64 = 9;
/// Days from `start_date` after which the tracking phase ends.
pub const TRACKING_DURATION: i64 = 10;
/// Days from `start_date` at which a buffer-phase `GENERAL_ACTIVITY` is
/// scheduled, conditional on the length of the preparation window.
pub const PREPARATION_GA: i64 = 14;
/// The longest preparation window; a second `GENERAL_ACTIVITY` is
/// scheduled only when the window is exactly this long.
pub const MAX_PREPARATION_DURATION: i64 = 21;
/// Number of weeks in the execution phase.
pub const EXECUTION_DURATION_WEEKS: i64 = 12;
/// Number of days in the execution phase (`EXECUTION_DURATION_WEEKS * 7`).
pub const EXECUTION_DURATION: i64 = 84;
