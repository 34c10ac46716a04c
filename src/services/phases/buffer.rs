//! Buffer phase (spec §4.4 "buffer").
//!
//! Grounded in `controller.py`'s `BufferState`.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::services::context::Context;
use crate::services::phases::PhaseHandler;
use crate::services::planner::complete_dialog;

pub struct BufferPhase;

#[async_trait]
impl PhaseHandler for BufferPhase {
    fn tag(&self) -> PhaseStateTag {
        PhaseStateTag::Buffer
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Preparation
    }

    async fn run(&self, ctx: &Context) -> DomainResult<Transition> {
        check_end_date(ctx, ctx.clock.today()).await
    }

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        // The buffer-phase GENERAL_ACTIVITY dialogs planned back in
        // goals-setting (§4.4) fire and complete during this window;
        // they are expected completions, not spurious ones.
        complete_dialog(ctx, component, PhaseId::Preparation).await?;
        Ok(Transition::Keep)
    }

    async fn on_new_day(&self, ctx: &Context, today: NaiveDate) -> DomainResult<Transition> {
        check_end_date(ctx, today).await
    }
}

async fn check_end_date(ctx: &Context, today: NaiveDate) -> DomainResult<Transition> {
    let user = ctx.user().await?;
    if today >= user.quit_date {
        Ok(Transition::MoveTo(PhaseStateTag::ExecutionRun))
    } else {
        Ok(Transition::Keep)
    }
}
