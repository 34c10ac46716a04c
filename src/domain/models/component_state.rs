//! Per-user component scheduling state.
//!
//! `ComponentState` rows form an append-only log per (user, component);
//! the most-recently-touched row is authoritative (spec §3, §9 open
//! question resolved as append-only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::ComponentName;

/// The phase a `ComponentState` row was scheduled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    Preparation = 1,
    Execution = 2,
    Lapse = 3,
}

impl PhaseId {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            1 => Some(Self::Preparation),
            2 => Some(Self::Execution),
            3 => Some(Self::Lapse),
            _ => None,
        }
    }
}

/// One scheduling decision for a (user, component) pair.
///
/// A row is written by `plan_and_store` (scheduled), by
/// `on_dialog_rescheduled` (rescheduled, with a fresh `task_handle`), and
/// by `on_dialog_completed` (completed, `task_handle` cleared). Invariant:
/// at most one row per (user, component) carries a non-null `task_handle`
/// that is still outstanding in the task queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub component: ComponentName,
    pub phase_id: PhaseId,
    pub completed: bool,
    pub last_touched: DateTime<Utc>,
    pub last_part: i32,
    pub next_planned_date: Option<DateTime<Utc>>,
    pub task_handle: Option<Uuid>,
}

impl ComponentState {
    /// A freshly scheduled row: not completed, progress reset, carrying the
    /// task-queue handle returned by `schedule`/`schedule_now`.
    pub fn scheduled(
        user_id: Uuid,
        component: ComponentName,
        phase_id: PhaseId,
        next_planned_date: Option<DateTime<Utc>>,
        task_handle: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            component,
            phase_id,
            completed: false,
            last_touched: Utc::now(),
            last_part: 0,
            next_planned_date,
            task_handle: Some(task_handle),
        }
    }

    /// A completed row: terminal for this delivery, `task_handle` cleared,
    /// `last_part` carried over from the most recent row. `phase` is the
    /// *current* phase at completion time, not necessarily `previous`'s —
    /// a dialog scheduled in one phase can complete after the controller
    /// has already moved to another (spec.md:191 "for every completed
    /// dialog d in phase P, the stored row has ... phase_id=P").
    pub fn completed(previous: &ComponentState, phase: PhaseId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: previous.user_id,
            component: previous.component,
            phase_id: phase,
            completed: true,
            last_touched: Utc::now(),
            last_part: previous.last_part,
            next_planned_date: previous.next_planned_date,
            task_handle: None,
        }
    }

    /// A completed row with no prior scheduled row to carry forward from
    /// (a spurious or out-of-band completion). `last_part` starts at 0.
    pub fn completed_standalone(user_id: Uuid, component: ComponentName, phase_id: PhaseId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            component,
            phase_id,
            completed: true,
            last_touched: Utc::now(),
            last_part: 0,
            next_planned_date: None,
            task_handle: None,
        }
    }

    /// A rescheduled row: same component/phase, new planned date and task
    /// handle; the caller is responsible for canceling the previous handle.
    pub fn rescheduled(
        previous: &ComponentState,
        new_planned_date: DateTime<Utc>,
        task_handle: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: previous.user_id,
            component: previous.component,
            phase_id: previous.phase_id,
            completed: false,
            last_touched: Utc::now(),
            last_part: previous.last_part,
            next_planned_date: Some(new_planned_date),
            task_handle: Some(task_handle),
        }
    }
}
