//! Execution-run phase (spec §4.4 "execution-run").
//!
//! Grounded in `controller.py`'s `ExecutionRunState`.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::domain::ports::clock::{execution_week_for, is_new_week};
use crate::services::context::Context;
use crate::services::phases::PhaseHandler;
use crate::services::planner::{complete_dialog, plan_and_store, PlannedDate};

pub struct ExecutionRunPhase;

#[async_trait]
impl PhaseHandler for ExecutionRunPhase {
    fn tag(&self) -> PhaseStateTag {
        PhaseStateTag::ExecutionRun
    }

    fn phase_id(&self) -> PhaseId {
        PhaseId::Execution
    }

    async fn run(&self, ctx: &Context) -> DomainResult<Transition> {
        if ctx.controller_state_repo.execution_week(ctx.user_id).await?.is_none() {
            ctx.controller_state_repo.set_execution_week(ctx.user_id, 1).await?;
        }
        // The `EXECUTION_INTRODUCTION` dialog was already planned for
        // `quit_date` back in goals-setting; nothing more to do on enter.
        Ok(Transition::Keep)
    }

    async fn on_dialog_completed(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        complete_dialog(ctx, component, PhaseId::Execution).await?;

        match component {
            ComponentName::ExecutionIntroduction => {
                plan_and_store(ctx, ComponentName::GeneralActivity, PhaseId::Execution, PlannedDate::Preferred)
                    .await?;
                Ok(Transition::Keep)
            }
            ComponentName::GeneralActivity => {
                plan_and_store(ctx, ComponentName::WeeklyReflection, PhaseId::Execution, PlannedDate::Preferred)
                    .await?;
                Ok(Transition::Keep)
            }
            ComponentName::WeeklyReflection => {
                let week = ctx.controller_state_repo.execution_week(ctx.user_id).await?.unwrap_or(1);
                if week == 3 || week == 8 {
                    plan_and_store(ctx, ComponentName::FutureSelfShort, PhaseId::Execution, PlannedDate::Preferred)
                        .await?;
                    Ok(Transition::Keep)
                } else if week == 12 {
                    Ok(Transition::MoveTo(PhaseStateTag::Closing))
                } else {
                    schedule_next_weekly_reflection(ctx).await?;
                    Ok(Transition::Keep)
                }
            }
            ComponentName::FutureSelfShort => {
                schedule_next_weekly_reflection(ctx).await?;
                Ok(Transition::Keep)
            }
            _ => {
                tracing::info!(component = component.as_str(), "unexpected completion in execution-run, ignoring");
                Ok(Transition::Keep)
            }
        }
    }

    async fn on_user_trigger(&self, ctx: &Context, component: ComponentName) -> DomainResult<Transition> {
        plan_and_store(ctx, component, PhaseId::Execution, PlannedDate::Preferred).await?;
        if component == ComponentName::RelapseDialog {
            Ok(Transition::MoveTo(PhaseStateTag::Relapse))
        } else {
            Ok(Transition::Keep)
        }
    }

    async fn on_new_day(&self, ctx: &Context, today: NaiveDate) -> DomainResult<Transition> {
        let user = ctx.user().await?;
        if is_new_week(today, user.quit_date) {
            let week = execution_week_for(today, user.quit_date);
            ctx.controller_state_repo.set_execution_week(ctx.user_id, week).await?;
        }
        Ok(Transition::Keep)
    }
}

/// Plan the next `WEEKLY_REFLECTION` one week after its last planned date
/// (or today, if none is on record), at the user's preferred hour.
async fn schedule_next_weekly_reflection(ctx: &Context) -> DomainResult<()> {
    let anchor = match ctx
        .component_state_repo
        .last_state(ctx.user_id, ComponentName::WeeklyReflection)
        .await?
        .and_then(|s| s.next_planned_date)
    {
        Some(dt) => dt.date_naive(),
        None => ctx.clock.today(),
    };
    let next_date = anchor + Duration::weeks(1);
    let at = ctx.at_preferred_hour(next_date).await?;
    plan_and_store(ctx, ComponentName::WeeklyReflection, PhaseId::Execution, PlannedDate::At(at)).await?;
    Ok(())
}
