//! Goals-setting phase (spec §4.4 "goals-setting").
//!
//! Grounded in `controller.py`'s `GoalsSettingState`. The original
//! schedules two conditional buffer-phase `GENERAL_ACTIVITY` dialogs with
//! independent `if` checks (not `elif`): when the preparation window is
//! exactly `MAX_PREPARATION_DURATION` days both fire, each carrying its
//! own task handle. That is preserved here rather than "fixed" into a
//! single occurrence, since §4.4 describes both conditions as separate
//! scheduling actions.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::services::constants::{GOAL_SETTING, MAX_PREPARATION_DURATION, PREPARATION_GA};
use crate::services::context::Context;
use crate::services::phases::PhaseHandler;
use crate::services::planner::{complete_dialog, plan_and_store, PlannedDate};

pub struct GoalsSettingPhase;

#[async_trait]
impl PhaseHandler for GoalsSettingPhase {
    fn tag(&self) -> PhaseStateTag {
        PhaseStateTag::GoalsSetting
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Preparation
    }

    async fn run(&self, ctx: &Context) -> DomainResult<Transition> {
        let user = ctx.user().await?;
        let due_date = user.start_date + Duration::days(GOAL_SETTING);
        let today = ctx.clock.today();

        let planned = if today >= due_date {
            PlannedDate::Now
        } else {
            PlannedDate::At(ctx.at_preferred_hour(due_date).await?)
        };

        plan_and_store(ctx, ComponentName::GoalSetting, PhaseId::Preparation, planned).await?;
        Ok(Transition::Keep)
    }

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        complete_dialog(ctx, component, PhaseId::Preparation).await?;

        match component {
            ComponentName::GoalSetting => {
                plan_and_store(ctx, ComponentName::FirstAidKitVideo, PhaseId::Preparation, PlannedDate::Preferred)
                    .await?;
                plan_buffer_phase_dialogs(ctx).await?;
                plan_execution_start_dialog(ctx).await?;
                activate_pa_notifications(ctx).await?;
                Ok(Transition::Keep)
            }
            ComponentName::FirstAidKitVideo => Ok(Transition::MoveTo(PhaseStateTag::Buffer)),
            _ => {
                tracing::info!(component = component.as_str(), "unexpected completion in goals-setting, ignoring");
                Ok(Transition::Keep)
            }
        }
    }
}

async fn plan_buffer_phase_dialogs(ctx: &Context) -> DomainResult<()> {
    let user = ctx.user().await?;
    let window = (user.quit_date - user.start_date).num_days();

    if window >= PREPARATION_GA {
        let date = user.start_date + Duration::days(PREPARATION_GA);
        let at = ctx.at_preferred_hour(date).await?;
        plan_and_store(ctx, ComponentName::GeneralActivity, PhaseId::Preparation, PlannedDate::At(at)).await?;
    }

    if window == MAX_PREPARATION_DURATION {
        let date = user.start_date + Duration::days(MAX_PREPARATION_DURATION);
        let at = ctx.at_preferred_hour(date).await?;
        plan_and_store(ctx, ComponentName::GeneralActivity, PhaseId::Preparation, PlannedDate::At(at)).await?;
    }

    Ok(())
}

async fn plan_execution_start_dialog(ctx: &Context) -> DomainResult<()> {
    let user = ctx.user().await?;
    let at = ctx.at_preferred_hour(user.quit_date).await?;
    plan_and_store(ctx, ComponentName::ExecutionIntroduction, PhaseId::Preparation, PlannedDate::At(at)).await?;
    Ok(())
}

/// Daily `PA_NOTIFICATION`s from tomorrow through `quit_date +
/// EXECUTION_DURATION`, inclusive of both ends (spec §4.4 goals-setting).
async fn activate_pa_notifications(ctx: &Context) -> DomainResult<()> {
    use crate::services::constants::EXECUTION_DURATION;

    let user = ctx.user().await?;
    let first_date = ctx.clock.today() + Duration::days(1);
    let last_date = user.quit_date + Duration::days(EXECUTION_DURATION);

    let mut date = first_date;
    while date <= last_date {
        let at = ctx.at_preferred_hour(date).await?;
        plan_and_store(ctx, ComponentName::PaNotification, PhaseId::Preparation, PlannedDate::At(at)).await?;
        date += Duration::days(1);
    }
    Ok(())
}
