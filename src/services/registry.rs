//! Controller registry (spec §4.5): the mapping from user id to the
//! currently-active phase state, event dispatch, and cold-start rehydration.
//!
//! Grounded in the teacher's single-writer-discipline registries
//! (`services::hook_registry`, `services::adapter_registry`): one
//! `RwLock<HashMap<..>>` guards insertion, with a per-entry
//! `tokio::sync::Mutex` serializing events for that one key. The phase
//! tag itself lives in `ControllerStateRepository`, not in the map — the
//! map's job is purely per-user serialization (spec §5), so the tag is
//! always read fresh rather than cached and risking drift across
//! restarts or concurrent dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ComponentName, PhaseStateTag, Transition};
use crate::domain::ports::{
    Clock, ComponentRepository, ComponentStateRepository, ControllerStateRepository, TaskQueue, UserRepository,
};
use crate::domain::models::ScheduleConfig;
use crate::services::context::Context;
use crate::services::events::ControllerEvent;
use crate::services::phases::handler_for;

/// Shared, cloneable ports every per-user `Context` is built from.
#[derive(Clone)]
pub struct SharedPorts {
    pub user_repo: Arc<dyn UserRepository>,
    pub component_repo: Arc<dyn ComponentRepository>,
    pub component_state_repo: Arc<dyn ComponentStateRepository>,
    pub controller_state_repo: Arc<dyn ControllerStateRepository>,
    pub task_queue: Arc<dyn TaskQueue>,
    pub clock: Arc<dyn Clock>,
    pub schedule: ScheduleConfig,
}

pub struct ControllerRegistry {
    shared: SharedPorts,
    locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ControllerRegistry {
    pub fn new(shared: SharedPorts) -> Self {
        Self {
            shared,
            locks: RwLock::new(HashMap::new()),
        }
    }

    pub fn user_repo(&self) -> &Arc<dyn UserRepository> {
        &self.shared.user_repo
    }

    pub fn controller_state_repo(&self) -> &Arc<dyn ControllerStateRepository> {
        &self.shared.controller_state_repo
    }

    pub fn component_state_repo(&self) -> &Arc<dyn ComponentStateRepository> {
        &self.shared.component_state_repo
    }

    fn context_for(&self, user_id: Uuid) -> Context {
        Context {
            user_id,
            user_repo: self.shared.user_repo.clone(),
            component_repo: self.shared.component_repo.clone(),
            component_state_repo: self.shared.component_state_repo.clone(),
            controller_state_repo: self.shared.controller_state_repo.clone(),
            task_queue: self.shared.task_queue.clone(),
            clock: self.shared.clock.clone(),
            schedule: self.shared.schedule.clone(),
        }
    }

    async fn lock_for(&self, user_id: Uuid) -> Option<Arc<Mutex<()>>> {
        self.locks.read().await.get(&user_id).cloned()
    }

    /// Register a user's serialization lock without invoking `run()`.
    /// Used both at enrollment (immediately followed by an explicit
    /// `run_onboarding`) and at cold-start rehydration (spec §4.5: "No
    /// automatic run() is invoked on rehydrate").
    pub async fn register(&self, user_id: Uuid) {
        self.locks.write().await.entry(user_id).or_insert_with(|| Arc::new(Mutex::new(())));
    }

    /// Cold-start rehydration: register every enrolled user's lock from
    /// persistence. Scheduled tasks already in the task queue fire on
    /// their own; this step only restores per-user serialization.
    pub async fn rehydrate(&self) -> DomainResult<usize> {
        let states = self.shared.controller_state_repo.list_all().await?;
        let count = states.len();
        for state in states {
            self.register(state.user_id).await;
        }
        info!(count, "rehydrated controller registry from persistence");
        Ok(count)
    }

    /// Drive a brand-new enrollment into `onboarding`'s `run()`. The
    /// registry must already hold the user's `ControllerState` row
    /// (written by the enrollment flow before this call).
    pub async fn run_onboarding(&self, user_id: Uuid) -> DomainResult<()> {
        self.register(user_id).await;
        let lock = self.lock_for(user_id).await.ok_or(DomainError::ControllerNotFound(user_id))?;
        let _guard = lock.lock().await;
        let ctx = self.context_for(user_id);
        let transition = handler_for(PhaseStateTag::Onboarding).run(&ctx).await?;
        self.apply_transition(&ctx, transition).await
    }

    /// Dispatch one event to a user's live controller, serialized against
    /// any other event for the same user (spec §4.5, §5).
    pub async fn dispatch(&self, user_id: Uuid, event: ControllerEvent) -> DomainResult<()> {
        let lock = self.lock_for(user_id).await.ok_or(DomainError::ControllerNotFound(user_id))?;
        let _guard = lock.lock().await;

        let ctx = self.context_for(user_id);
        let current = self.shared.controller_state_repo.current_phase_state(user_id).await?;
        let handler = handler_for(current.phase);

        info!(user_id = %user_id, phase = current.phase.as_str(), event = event.kind(), "dispatching event");

        let transition = match event {
            ControllerEvent::NewDay(today) => handler.on_new_day(&ctx, today).await,
            ControllerEvent::DialogCompleted(component) => handler.on_dialog_completed(&ctx, component).await,
            ControllerEvent::DialogRescheduled(component, at) => {
                handler.on_dialog_rescheduled(&ctx, component, at).await
            }
            ControllerEvent::UserTrigger(component) => handler.on_user_trigger(&ctx, component).await,
        }?;

        self.apply_transition(&ctx, transition).await
    }

    /// Advance through every `MoveTo` a handler's `run()` itself returns
    /// (e.g. buffer transitioning straight into execution-run if the
    /// quit date has already passed by the time it's entered).
    async fn apply_transition(&self, ctx: &Context, mut transition: Transition) -> DomainResult<()> {
        while let Transition::MoveTo(next) = transition {
            info!(user_id = %ctx.user_id, to = next.as_str(), "phase transition");
            self.shared.controller_state_repo.set_phase_state(ctx.user_id, next).await?;
            transition = handler_for(next).run(ctx).await?;
        }
        Ok(())
    }

    /// Broadcast a `new-day` tick to every registered user (spec §4.1:
    /// "Ordering among per-user deliveries on the same tick is
    /// unspecified and must not affect correctness"). One user's
    /// `PersistenceFailure`/`ScheduleFailure` is logged and does not
    /// block delivery to the others.
    pub async fn broadcast_new_day(&self, today: NaiveDate) {
        let user_ids: Vec<Uuid> = self.locks.read().await.keys().copied().collect();
        info!(count = user_ids.len(), %today, "broadcasting new-day tick");
        for user_id in user_ids {
            if let Err(e) = self.dispatch(user_id, ControllerEvent::NewDay(today)).await {
                if e.is_terminal_for_event() {
                    warn!(user_id = %user_id, error = %e, "new-day tick dropped for user");
                } else {
                    error!(user_id = %user_id, error = %e, "new-day tick failed for user, will retry on next tick");
                }
            }
        }
    }

    /// Validate that `component` is in the catalog before an ingress
    /// handler bothers dispatching (spec §6 "Unknown component_name:
    /// error, event rejected").
    pub async fn resolve_component(&self, name: &str) -> DomainResult<ComponentName> {
        ComponentName::from_str(name).ok_or_else(|| DomainError::ComponentNotFound(name.to_string()))
    }
}
