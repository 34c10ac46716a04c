//! Trigger sink port: the one-way channel that delivers a named trigger
//! to the external conversational front end for a specific user.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;

#[async_trait]
pub trait TriggerSink: Send + Sync {
    /// Deliver `trigger` to the front end for `user_id`. A non-2xx
    /// response (or transport error) is mapped to `DomainError::DeliveryFailure`
    /// and retried by the task queue's reconciler, never surfaced to the
    /// participant (spec §7).
    async fn send(&self, user_id: Uuid, trigger: &str) -> DomainResult<()>;
}
