//! Inbound controller events (spec §4.4, §6).
//!
//! These are the four typed events the ingress funnels to
//! `ControllerRegistry::dispatch`, one per arrival at the HTTP boundary or
//! the daily clock tick.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::models::ComponentName;

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The daily clock broadcast; `today` is the civil date of the tick.
    NewDay(NaiveDate),
    /// The front end reports a dialog finished.
    DialogCompleted(ComponentName),
    /// The user accepted a reschedule offer for a pending dialog.
    DialogRescheduled(ComponentName, DateTime<Utc>),
    /// The user proactively invoked a component from the menu.
    UserTrigger(ComponentName),
}

impl ControllerEvent {
    /// A short, stable label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewDay(_) => "new-day",
            Self::DialogCompleted(_) => "dialog-completed",
            Self::DialogRescheduled(_, _) => "dialog-rescheduled",
            Self::UserTrigger(_) => "user-trigger",
        }
    }
}
