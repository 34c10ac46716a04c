//! Controller phase state: the tag a live per-user state machine carries,
//! and the persisted row that lets the registry rehydrate it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the seven phase-state tags from spec §4.4's linear-with-back-edges
/// diagram: `onboarding -> tracking -> goals_setting -> buffer ->
/// execution_run <-> relapse`, with `buffer -> closing` never direct (buffer
/// always routes through execution_run) and `execution_run -> closing` at
/// week 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStateTag {
    Onboarding,
    Tracking,
    GoalsSetting,
    Buffer,
    ExecutionRun,
    Relapse,
    Closing,
}

impl PhaseStateTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Tracking => "tracking",
            Self::GoalsSetting => "goals_setting",
            Self::Buffer => "buffer",
            Self::ExecutionRun => "execution_run",
            Self::Relapse => "relapse",
            Self::Closing => "closing",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "onboarding" => Some(Self::Onboarding),
            "tracking" => Some(Self::Tracking),
            "goals_setting" => Some(Self::GoalsSetting),
            "buffer" => Some(Self::Buffer),
            "execution_run" => Some(Self::ExecutionRun),
            "relapse" => Some(Self::Relapse),
            "closing" => Some(Self::Closing),
            _ => None,
        }
    }
}

/// The persisted control state for one user: phase tag plus the
/// execution-week counter (meaningful only in `execution_run`/`relapse`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerState {
    pub user_id: Uuid,
    pub phase: PhaseStateTag,
    pub execution_week: Option<u32>,
}

impl ControllerState {
    pub fn new_enrollment(user_id: Uuid) -> Self {
        Self {
            user_id,
            phase: PhaseStateTag::Onboarding,
            execution_week: None,
        }
    }
}

/// What a phase handler wants to happen after processing an event: stay put,
/// or hand control to a new phase (the registry then invokes the new
/// phase's `run()`). This is the explicit replacement for the source's
/// mutable `new_state` field (spec §9 design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Keep,
    MoveTo(PhaseStateTag),
}
