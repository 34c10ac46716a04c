//! Repository port for the per-user `ControllerState` (phase + week).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ControllerState, PhaseStateTag};

#[async_trait]
pub trait ControllerStateRepository: Send + Sync {
    async fn current_phase_state(&self, user_id: Uuid) -> DomainResult<ControllerState>;

    async fn set_phase_state(&self, user_id: Uuid, phase: PhaseStateTag) -> DomainResult<()>;

    async fn execution_week(&self, user_id: Uuid) -> DomainResult<Option<u32>>;

    async fn set_execution_week(&self, user_id: Uuid, week: u32) -> DomainResult<()>;

    /// Create the initial `onboarding` row at enrollment.
    async fn create(&self, state: &ControllerState) -> DomainResult<()>;

    async fn list_all(&self) -> DomainResult<Vec<ControllerState>>;
}
