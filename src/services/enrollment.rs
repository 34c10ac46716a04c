//! User enrollment: the one-time setup that creates a `User`, its
//! `UserPreferences`, and the initial `onboarding` `ControllerState` row,
//! then drives the registry's first `run()` (spec §3 "Lifecycles").

use chrono::{NaiveDate, Weekday};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ActivityGroup, ControllerState, DayPart, User, UserPreferences};
use crate::services::registry::ControllerRegistry;

pub struct EnrollmentRequest {
    /// Fixed id for single-user bootstrap mode (spec §6 `test_user_id`);
    /// a fresh one is generated when absent.
    pub user_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub quit_date: NaiveDate,
    pub activity_group: ActivityGroup,
    pub preferred_weekday: Weekday,
    pub preferred_daypart: DayPart,
}

/// Enroll a new participant and immediately drive the registry into
/// `onboarding`'s on-enter scheduling.
pub async fn enroll_user(registry: &ControllerRegistry, request: EnrollmentRequest) -> DomainResult<Uuid> {
    let user_id = request.user_id.unwrap_or_else(Uuid::new_v4);
    let user = User {
        id: user_id,
        start_date: request.start_date,
        quit_date: request.quit_date,
        activity_group: request.activity_group,
    };
    let preferences = UserPreferences {
        user_id,
        preferred_weekday: request.preferred_weekday,
        preferred_daypart: request.preferred_daypart,
    };

    registry.user_repo().insert_user(&user, &preferences).await?;
    registry
        .controller_state_repo()
        .create(&ControllerState::new_enrollment(user_id))
        .await?;

    registry.run_onboarding(user_id).await?;
    Ok(user_id)
}
