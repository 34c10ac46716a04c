//! Repository port for the append-only `ComponentState` log.

use async_trait::async_trait;
use chrono::{DateTime, Utc, Weekday};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ComponentName, ComponentState};
use crate::domain::ports::clock::next_weekday_on_or_after;

#[async_trait]
pub trait ComponentStateRepository: Send + Sync {
    /// Append a new row. Callers never mutate an existing row; "latest
    /// wins" is a read-time concern (spec §9 open question).
    async fn store(&self, state: &ComponentState) -> DomainResult<()>;

    /// The most-recently-touched row for (user, component), if any.
    async fn last_state(
        &self,
        user_id: Uuid,
        component: ComponentName,
    ) -> DomainResult<Option<ComponentState>>;

    /// True iff the most-recent row has `completed = true`.
    async fn get_completion(&self, user_id: Uuid, component: ComponentName) -> DomainResult<bool> {
        Ok(self
            .last_state(user_id, component)
            .await?
            .map(|s| s.completed)
            .unwrap_or(false))
    }

    /// The next preferred delivery datetime for a component: the stored
    /// `next_planned_date` of the most recent row if set, otherwise the
    /// next occurrence of `preferred_weekday` on or after
    /// `fallback_tomorrow_at_preferred_hour`'s date, at that same hour
    /// (spec §4.1 "aligns to the user's weekday and hour").
    async fn get_next_planned_date(
        &self,
        user_id: Uuid,
        component: ComponentName,
        preferred_weekday: Weekday,
        fallback_tomorrow_at_preferred_hour: DateTime<Utc>,
    ) -> DomainResult<DateTime<Utc>> {
        if let Some(state) = self.last_state(user_id, component).await? {
            if let Some(planned) = state.next_planned_date {
                return Ok(planned);
            }
        }
        let aligned_date = next_weekday_on_or_after(fallback_tomorrow_at_preferred_hour.date_naive(), preferred_weekday);
        let days_ahead = (aligned_date - fallback_tomorrow_at_preferred_hour.date_naive()).num_days();
        Ok(fallback_tomorrow_at_preferred_hour + chrono::Duration::days(days_ahead))
    }
}
