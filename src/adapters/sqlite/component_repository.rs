//! SQLite implementation of `ComponentRepository`, plus catalog seeding.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Component, ComponentName, ComponentType};
use crate::domain::ports::ComponentRepository;

#[derive(Clone)]
pub struct SqliteComponentRepository {
    pool: SqlitePool,
}

impl SqliteComponentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Seed the immutable catalog from `ComponentName::ALL` if it is empty.
    /// Idempotent: safe to call on every startup.
    pub async fn seed_catalog(&self) -> DomainResult<()> {
        for name in ComponentName::ALL {
            let exists: Option<(i64,)> =
                sqlx::query_as("SELECT 1 FROM intervention_components WHERE name = ?")
                    .bind(name.as_str())
                    .fetch_optional(&self.pool)
                    .await?;
            if exists.is_some() {
                continue;
            }
            sqlx::query(
                "INSERT INTO intervention_components (id, name, trigger, component_type) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(name.as_str())
            .bind(name.trigger())
            .bind(name.component_type().as_str())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ComponentRow {
    id: String,
    name: String,
    trigger: String,
    component_type: String,
}

impl ComponentRow {
    fn into_component(self) -> DomainResult<Component> {
        Ok(Component {
            id: Uuid::parse_str(&self.id).map_err(|e| DomainError::PersistenceFailure(e.to_string()))?,
            name: ComponentName::from_str(&self.name)
                .ok_or_else(|| DomainError::ComponentNotFound(self.name.clone()))?,
            trigger: self.trigger,
            component_type: match self.component_type.as_str() {
                "dialog" => ComponentType::Dialog,
                "notification" => ComponentType::Notification,
                other => return Err(DomainError::PersistenceFailure(format!("bad component_type: {other}"))),
            },
        })
    }
}

#[async_trait]
impl ComponentRepository for SqliteComponentRepository {
    async fn get_component_by_name(&self, name: ComponentName) -> DomainResult<Component> {
        let row: Option<ComponentRow> = sqlx::query_as(
            "SELECT id, name, trigger, component_type FROM intervention_components WHERE name = ?",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DomainError::ComponentNotFound(name.as_str().to_string()))?
            .into_component()
    }

    async fn get_component_by_id(&self, id: Uuid) -> DomainResult<Component> {
        let row: Option<ComponentRow> = sqlx::query_as(
            "SELECT id, name, trigger, component_type FROM intervention_components WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DomainError::ComponentNotFound(id.to_string()))?.into_component()
    }
}
