//! Delayed task queue port (spec §4.3).
//!
//! Guarantees at-least-once firing at or after `eta`. `cancel` is
//! best-effort: a task that races firing against cancellation may still
//! fire once; the caller tolerates this (spec §5 fingerprint absorption).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// An opaque handle to a submitted (possibly already-fired) task.
pub type TaskHandle = Uuid;

#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Schedule `trigger` for `user_id` to fire at or after `eta`.
    async fn schedule(
        &self,
        trigger: &str,
        user_id: Uuid,
        eta: DateTime<Utc>,
    ) -> DomainResult<TaskHandle>;

    /// Schedule `trigger` for `user_id` to fire as soon as possible.
    async fn schedule_now(&self, trigger: &str, user_id: Uuid) -> DomainResult<TaskHandle>;

    /// Best-effort cancellation of a previously submitted task.
    async fn cancel(&self, handle: TaskHandle) -> DomainResult<()>;
}
