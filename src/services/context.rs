//! Per-dispatch context: the shared ports plus the user a handler is
//! currently acting on. Cheap to construct — every field is a clone of an
//! `Arc` held by the registry.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::user::{DayPart, UserPreferences};
use crate::domain::models::{ScheduleConfig, User};
use crate::domain::ports::{
    Clock, ComponentRepository, ComponentStateRepository, ControllerStateRepository, TaskQueue,
    UserRepository,
};

#[derive(Clone)]
pub struct Context {
    pub user_id: Uuid,
    pub user_repo: Arc<dyn UserRepository>,
    pub component_repo: Arc<dyn ComponentRepository>,
    pub component_state_repo: Arc<dyn ComponentStateRepository>,
    pub controller_state_repo: Arc<dyn ControllerStateRepository>,
    pub task_queue: Arc<dyn TaskQueue>,
    pub clock: Arc<dyn Clock>,
    pub schedule: ScheduleConfig,
}

impl Context {
    pub async fn user(&self) -> DomainResult<User> {
        self.user_repo.get_user(self.user_id).await
    }

    pub async fn preferences(&self) -> DomainResult<UserPreferences> {
        self.user_repo.get_preferences(self.user_id).await
    }

    pub fn preferred_hour(&self, daypart: DayPart) -> u32 {
        self.schedule.hour_for(daypart)
    }

    /// `date` at the user's preferred daypart, in the fixed civil zone.
    pub async fn at_preferred_hour(&self, date: NaiveDate) -> DomainResult<DateTime<Utc>> {
        let prefs = self.preferences().await?;
        Ok(self.clock.at_hour(date, self.preferred_hour(prefs.preferred_daypart)))
    }

    pub async fn tomorrow_at_preferred_hour(&self) -> DomainResult<DateTime<Utc>> {
        let tomorrow = self.clock.today() + chrono::Duration::days(1);
        self.at_preferred_hour(tomorrow).await
    }
}
