//! The intervention component catalog.
//!
//! The catalog is immutable at runtime: every `ComponentName` the
//! controller can plan is one of this closed set, grounded in
//! `original_source/scheduler/state_machine/const.py` and
//! `controller.py`'s `Components`/`Notifications` references.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of component names the controller schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentName {
    PreparationIntroduction,
    ProfileCreation,
    MedicationTalk,
    TrackBehavior,
    FutureSelfLong,
    FutureSelfShort,
    GoalSetting,
    FirstAidKitVideo,
    ExecutionIntroduction,
    GeneralActivity,
    WeeklyReflection,
    ClosingDialog,
    RelapseDialog,
    RelapseDialogHrs,
    RelapseDialogLapse,
    RelapseDialogRelapse,
    RelapseDialogPa,
    TrackNotification,
    PaNotification,
    BeforeQuitNotification,
    QuitDateNotification,
}

impl ComponentName {
    pub const ALL: &'static [ComponentName] = &[
        Self::PreparationIntroduction,
        Self::ProfileCreation,
        Self::MedicationTalk,
        Self::TrackBehavior,
        Self::FutureSelfLong,
        Self::FutureSelfShort,
        Self::GoalSetting,
        Self::FirstAidKitVideo,
        Self::ExecutionIntroduction,
        Self::GeneralActivity,
        Self::WeeklyReflection,
        Self::ClosingDialog,
        Self::RelapseDialog,
        Self::RelapseDialogHrs,
        Self::RelapseDialogLapse,
        Self::RelapseDialogRelapse,
        Self::RelapseDialogPa,
        Self::TrackNotification,
        Self::PaNotification,
        Self::BeforeQuitNotification,
        Self::QuitDateNotification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreparationIntroduction => "preparation_introduction",
            Self::ProfileCreation => "profile_creation",
            Self::MedicationTalk => "medication_talk",
            Self::TrackBehavior => "track_behavior",
            Self::FutureSelfLong => "future_self_long",
            Self::FutureSelfShort => "future_self_short",
            Self::GoalSetting => "goal_setting",
            Self::FirstAidKitVideo => "first_aid_kit_video",
            Self::ExecutionIntroduction => "execution_introduction",
            Self::GeneralActivity => "general_activity",
            Self::WeeklyReflection => "weekly_reflection",
            Self::ClosingDialog => "closing_dialog",
            Self::RelapseDialog => "relapse_dialog",
            Self::RelapseDialogHrs => "relapse_dialog_hrs",
            Self::RelapseDialogLapse => "relapse_dialog_lapse",
            Self::RelapseDialogRelapse => "relapse_dialog_relapse",
            Self::RelapseDialogPa => "relapse_dialog_pa",
            Self::TrackNotification => "track_notification",
            Self::PaNotification => "pa_notification",
            Self::BeforeQuitNotification => "before_quit_notification",
            Self::QuitDateNotification => "quit_date_notification",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// The trigger string fired at the front end. Externally-fired triggers
    /// keep the `EXTERNAL_` prefix from the original Celery task naming.
    pub fn trigger(&self) -> String {
        format!("EXTERNAL_{}", self.as_str())
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::TrackNotification
            | Self::PaNotification
            | Self::BeforeQuitNotification
            | Self::QuitDateNotification => ComponentType::Notification,
            _ => ComponentType::Dialog,
        }
    }

    /// True if this is one of the five relapse-dialog variants the
    /// `relapse` phase reacts to identically on completion.
    pub fn is_relapse_variant(&self) -> bool {
        matches!(
            self,
            Self::RelapseDialog
                | Self::RelapseDialogHrs
                | Self::RelapseDialogLapse
                | Self::RelapseDialogRelapse
                | Self::RelapseDialogPa
        )
    }
}

/// A catalog entry: the persisted identity of a `ComponentName`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub name: ComponentName,
    pub trigger: String,
    pub component_type: ComponentType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Dialog,
    Notification,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::Notification => "notification",
        }
    }
}
