//! Relapse phase (spec §4.4 "relapse").
//!
//! Grounded in `controller.py`'s `RelapseState`.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::services::context::Context;
use crate::services::phases::PhaseHandler;
use crate::services::planner::{complete_dialog, plan_and_store, PlannedDate};

pub struct RelapsePhase;

#[async_trait]
impl PhaseHandler for RelapsePhase {
    fn tag(&self) -> PhaseStateTag {
        PhaseStateTag::Relapse
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Lapse
    }

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        complete_dialog(ctx, component, PhaseId::Lapse).await?;

        if !component.is_relapse_variant() {
            tracing::info!(component = component.as_str(), "unexpected completion in relapse, ignoring");
            return Ok(Transition::Keep);
        }

        // Re-read the user row: the relapse dialog may have updated
        // `quit_date` as a side effect (owned by the front end / its
        // validation logic, out of this controller's scope).
        let user = ctx.user().await?;
        let today = ctx.clock.today();

        if user.quit_date > today {
            let before_quit = user.quit_date - Duration::days(1);
            let before_quit_at = ctx.at_preferred_hour(before_quit).await?;
            let quit_date_at = ctx.at_preferred_hour(user.quit_date).await?;

            plan_and_store(
                ctx,
                ComponentName::BeforeQuitNotification,
                PhaseId::Lapse,
                PlannedDate::At(before_quit_at),
            )
            .await?;
            plan_and_store(
                ctx,
                ComponentName::QuitDateNotification,
                PhaseId::Lapse,
                PlannedDate::At(quit_date_at),
            )
            .await?;

            Ok(Transition::MoveTo(PhaseStateTag::Buffer))
        } else {
            Ok(Transition::MoveTo(PhaseStateTag::ExecutionRun))
        }
    }
}
