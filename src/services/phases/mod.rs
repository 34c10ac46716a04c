//! Per-state handlers (spec §4.4, §9 "class-based per-state handlers with
//! inheritance" design note). One interface, four optional event methods
//! plus `run()`; per-state implementations are plain zero-sized records
//! looked up by `PhaseStateTag` rather than dynamically subclassed.

pub mod buffer;
pub mod closing;
pub mod execution_run;
pub mod goals_setting;
pub mod onboarding;
pub mod relapse;
pub mod tracking;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::services::context::Context;
use crate::services::planner::{self, PlannedDate};

/// One phase-state's reaction to the four controller events plus its
/// on-enter scheduling. Default methods implement the behavior shared by
/// every phase in the original source (generic rescheduling and
/// user-triggered planning); phases override only what differs.
#[async_trait]
pub trait PhaseHandler: Send + Sync {
    fn tag(&self) -> PhaseStateTag;

    /// The `phase_id` stamped onto `ComponentState` rows this phase writes.
    fn phase_id(&self) -> PhaseId;

    /// On-enter scheduling, invoked by the registry right after a
    /// transition lands on this phase.
    async fn run(&self, _ctx: &Context) -> DomainResult<Transition> {
        Ok(Transition::Keep)
    }

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        info!(
            phase = self.tag().as_str(),
            component = component.as_str(),
            "dialog completion not expected in this phase, ignoring"
        );
        let _ = ctx;
        Ok(Transition::Keep)
    }

    async fn on_dialog_rescheduled(
        &self,
        ctx: &Context,
        component: ComponentName,
        new_datetime: DateTime<Utc>,
    ) -> DomainResult<Transition> {
        planner::reschedule(ctx, component, self.phase_id(), new_datetime).await?;
        Ok(Transition::Keep)
    }

    async fn on_user_trigger(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        planner::plan_and_store(ctx, component, self.phase_id(), PlannedDate::Preferred).await?;
        Ok(Transition::Keep)
    }

    async fn on_new_day(&self, _ctx: &Context, _today: NaiveDate) -> DomainResult<Transition> {
        Ok(Transition::Keep)
    }
}

/// Look up the (stateless, zero-sized) handler for a phase tag.
pub fn handler_for(tag: PhaseStateTag) -> Box<dyn PhaseHandler> {
    match tag {
        PhaseStateTag::Onboarding => Box::new(onboarding::OnboardingPhase),
        PhaseStateTag::Tracking => Box::new(tracking::TrackingPhase),
        PhaseStateTag::GoalsSetting => Box::new(goals_setting::GoalsSettingPhase),
        PhaseStateTag::Buffer => Box::new(buffer::BufferPhase),
        PhaseStateTag::ExecutionRun => Box::new(execution_run::ExecutionRunPhase),
        PhaseStateTag::Relapse => Box::new(relapse::RelapsePhase),
        PhaseStateTag::Closing => Box::new(closing::ClosingPhase),
    }
}
