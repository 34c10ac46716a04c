//! Onboarding phase (spec §4.4 "Phase-state contracts (onboarding)").
//!
//! Grounded in `original_source/scheduler/state_machine/controller.py`'s
//! `OnboardingState`.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::services::constants::FUTURE_SELF_INTRO;
use crate::services::context::Context;
use crate::services::phases::PhaseHandler;
use crate::services::planner::{complete_dialog, plan_and_store, PlannedDate};

pub struct OnboardingPhase;

#[async_trait]
impl PhaseHandler for OnboardingPhase {
    fn tag(&self) -> PhaseStateTag {
        PhaseStateTag::Onboarding
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Preparation
    }

    async fn run(&self, ctx: &Context) -> DomainResult<Transition> {
        plan_and_store(
            ctx,
            ComponentName::PreparationIntroduction,
            PhaseId::Preparation,
            PlannedDate::Preferred,
        )
        .await?;
        Ok(Transition::Keep)
    }

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        complete_dialog(ctx, component, PhaseId::Preparation).await?;

        match component {
            ComponentName::PreparationIntroduction => {
                plan_and_store(ctx, ComponentName::ProfileCreation, PhaseId::Preparation, PlannedDate::Preferred)
                    .await?;
                Ok(Transition::Keep)
            }
            ComponentName::ProfileCreation => {
                plan_and_store(ctx, ComponentName::MedicationTalk, PhaseId::Preparation, PlannedDate::Preferred)
                    .await?;
                Ok(Transition::Keep)
            }
            ComponentName::MedicationTalk => {
                plan_and_store(ctx, ComponentName::TrackBehavior, PhaseId::Preparation, PlannedDate::Preferred)
                    .await?;
                schedule_tracking_notifications(ctx).await?;
                Ok(Transition::Keep)
            }
            ComponentName::TrackBehavior => {
                plan_and_store(ctx, ComponentName::FutureSelfLong, PhaseId::Preparation, PlannedDate::Preferred)
                    .await?;
                Ok(Transition::Keep)
            }
            ComponentName::FutureSelfLong => {
                let user = ctx.user().await?;
                let fs_date = user.start_date + Duration::days(FUTURE_SELF_INTRO);
                let fs_datetime = ctx.at_preferred_hour(fs_date).await?;
                plan_and_store(
                    ctx,
                    ComponentName::FutureSelfShort,
                    PhaseId::Preparation,
                    PlannedDate::At(fs_datetime),
                )
                .await?;
                Ok(Transition::MoveTo(PhaseStateTag::Tracking))
            }
            _ => {
                tracing::info!(component = component.as_str(), "unexpected completion in onboarding, ignoring");
                Ok(Transition::Keep)
            }
        }
    }
}

/// Daily `TRACK_NOTIFICATION`s from tomorrow through `start_date + 8`,
/// inclusive of both ends (spec §4.4 onboarding, scenario 1).
async fn schedule_tracking_notifications(ctx: &Context) -> DomainResult<()> {
    let user = ctx.user().await?;
    let first_date = ctx.clock.today() + Duration::days(1);
    let last_date = user.start_date + Duration::days(8);

    let mut date = first_date;
    while date <= last_date {
        let at = ctx.at_preferred_hour(date).await?;
        plan_and_store(
            ctx,
            ComponentName::TrackNotification,
            PhaseId::Preparation,
            PlannedDate::At(at),
        )
        .await?;
        date += Duration::days(1);
    }
    Ok(())
}
