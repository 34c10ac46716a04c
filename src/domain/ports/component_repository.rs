//! Repository port for the immutable intervention-component catalog.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Component, ComponentName};

#[async_trait]
pub trait ComponentRepository: Send + Sync {
    async fn get_component_by_name(&self, name: ComponentName) -> DomainResult<Component>;

    async fn get_component_by_id(&self, id: Uuid) -> DomainResult<Component>;
}
