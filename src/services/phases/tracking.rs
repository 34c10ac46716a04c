//! Tracking phase (spec §4.4 "tracking").
//!
//! Grounded in `controller.py`'s `TrackingState`.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::domain::ports::clock::intervention_day;
use crate::services::constants::TRACKING_DURATION;
use crate::services::context::Context;
use crate::services::phases::PhaseHandler;
use crate::services::planner::complete_dialog;

pub struct TrackingPhase;

#[async_trait]
impl PhaseHandler for TrackingPhase {
    fn tag(&self) -> PhaseStateTag {
        PhaseStateTag::Tracking
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Preparation
    }

    // No `run()` override: per §4.4 "on enter: ... if already past, nothing
    // extra to plan; state will transition on next daily tick" — unlike
    // buffer, tracking never re-checks its end date on enter, only on
    // `new-day`.

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        complete_dialog(ctx, component, PhaseId::Preparation).await?;
        Ok(Transition::Keep)
    }

    async fn on_new_day(&self, ctx: &Context, today: NaiveDate) -> DomainResult<Transition> {
        let user = ctx.user().await?;
        let day = intervention_day(user.start_date, today);
        if day < TRACKING_DURATION {
            return Ok(Transition::Keep);
        }
        let self_completed = ctx
            .component_state_repo
            .get_completion(ctx.user_id, ComponentName::FutureSelfShort)
            .await?;
        if self_completed {
            Ok(Transition::MoveTo(PhaseStateTag::GoalsSetting))
        } else {
            Ok(Transition::Keep)
        }
    }
}
