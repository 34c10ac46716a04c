//! `plan_and_store`, the single scheduling procedure every phase handler
//! goes through (spec §4.4 "Plan-and-store").
//!
//! Grounded in `original_source/scheduler/state_machine/state_machine_utils.py`'s
//! `plan_and_store` / `reschedule_dialog` / `store_completed_dialog` trio,
//! referenced throughout `controller.py`.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, ComponentState};
use crate::services::context::Context;

/// How the caller wants the planned date resolved.
///
/// §9's open question on "absent planned_date" is fixed here: a caller
/// with no specific date in mind passes `Preferred`, which defers to the
/// persistence gateway's `get_next_planned_date` (a stored value, or
/// tomorrow at the user's preferred hour). `Now` is reserved for the
/// handful of call sites that explicitly want immediate dispatch (e.g.
/// goals-setting's past-deadline branch); it is not a fallback for
/// "no date given".
#[derive(Debug, Clone, Copy)]
pub enum PlannedDate {
    Now,
    At(DateTime<Utc>),
    Preferred,
}

/// Resolve the component, submit the task-queue entry, and persist a
/// freshly-scheduled `ComponentState` row. Steps 1-4 of spec §4.4.
pub async fn plan_and_store(
    ctx: &Context,
    component: ComponentName,
    phase: PhaseId,
    planned: PlannedDate,
) -> DomainResult<ComponentState> {
    let catalog = ctx.component_repo.get_component_by_name(component).await?;

    let resolved_date = match planned {
        PlannedDate::Now => None,
        PlannedDate::At(dt) => Some(dt),
        PlannedDate::Preferred => {
            let fallback = ctx.tomorrow_at_preferred_hour().await?;
            let preferred_weekday = ctx.preferences().await?.preferred_weekday;
            let date = ctx
                .component_state_repo
                .get_next_planned_date(ctx.user_id, component, preferred_weekday, fallback)
                .await?;
            Some(date)
        }
    };

    let handle = match resolved_date {
        Some(eta) => ctx.task_queue.schedule(&catalog.trigger, ctx.user_id, eta).await?,
        None => ctx.task_queue.schedule_now(&catalog.trigger, ctx.user_id).await?,
    };

    let state = ComponentState::scheduled(ctx.user_id, component, phase, resolved_date, handle);
    ctx.component_state_repo.store(&state).await?;
    info!(user_id = %ctx.user_id, component = component.as_str(), planned_date = ?resolved_date, "planned component");
    Ok(state)
}

/// Cancel the previous handle (if any) and persist a rescheduled row at
/// `new_datetime`. Used by `on_dialog_rescheduled`.
pub async fn reschedule(
    ctx: &Context,
    component: ComponentName,
    phase: PhaseId,
    new_datetime: DateTime<Utc>,
) -> DomainResult<ComponentState> {
    let catalog = ctx.component_repo.get_component_by_name(component).await?;
    let previous = ctx.component_state_repo.last_state(ctx.user_id, component).await?;

    if let Some(handle) = previous.as_ref().and_then(|p| p.task_handle) {
        ctx.task_queue.cancel(handle).await?;
    }

    let handle = ctx.task_queue.schedule(&catalog.trigger, ctx.user_id, new_datetime).await?;

    let state = match &previous {
        Some(prev) => ComponentState::rescheduled(prev, new_datetime, handle),
        None => ComponentState::scheduled(ctx.user_id, component, phase, Some(new_datetime), handle),
    };
    ctx.component_state_repo.store(&state).await?;
    info!(user_id = %ctx.user_id, component = component.as_str(), new_datetime = %new_datetime, "rescheduled component");
    Ok(state)
}

/// Persist a completed row: terminal for this delivery, task handle
/// cleared, `last_part` carried over from the most recent row if any.
pub async fn complete_dialog(ctx: &Context, component: ComponentName, phase: PhaseId) -> DomainResult<ComponentState> {
    let previous = ctx.component_state_repo.last_state(ctx.user_id, component).await?;
    let state = match previous {
        Some(prev) => ComponentState::completed(&prev, phase),
        None => {
            warn!(user_id = %ctx.user_id, component = component.as_str(), "dialog-completed with no prior scheduled row");
            ComponentState::completed_standalone(ctx.user_id, component, phase)
        }
    };
    ctx.component_state_repo.store(&state).await?;
    info!(user_id = %ctx.user_id, component = component.as_str(), "completed component");
    Ok(state)
}
