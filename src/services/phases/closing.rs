//! Closing phase (spec §4.4 "closing").
//!
//! Grounded in `controller.py`'s `ClosingState`, which stamps
//! `phase_id=2` on its completion rows (the execution phase's tag) even
//! though `PhaseStateTag::Closing` has no dedicated `PhaseId` of its own.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::services::context::Context;
use crate::services::phases::PhaseHandler;
use crate::services::planner::{complete_dialog, plan_and_store, PlannedDate};

pub struct ClosingPhase;

#[async_trait]
impl PhaseHandler for ClosingPhase {
    fn tag(&self) -> PhaseStateTag {
        PhaseStateTag::Closing
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Execution
    }

    async fn run(&self, ctx: &Context) -> DomainResult<Transition> {
        let fallback = ctx.tomorrow_at_preferred_hour().await?;
        let preferred_weekday = ctx.preferences().await?.preferred_weekday;
        let planned = ctx
            .component_state_repo
            .get_next_planned_date(ctx.user_id, ComponentName::ClosingDialog, preferred_weekday, fallback)
            .await?;
        plan_and_store(ctx, ComponentName::ClosingDialog, PhaseId::Execution, PlannedDate::At(planned)).await?;
        Ok(Transition::Keep)
    }

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        complete_dialog(ctx, component, PhaseId::Execution).await?;
        if component == ComponentName::ClosingDialog {
            tracing::info!(user_id = %ctx.user_id, "closing dialog completed, intervention finished");
        } else {
            tracing::info!(component = component.as_str(), "unexpected completion in closing, ignoring");
        }
        Ok(Transition::Keep)
    }
}
