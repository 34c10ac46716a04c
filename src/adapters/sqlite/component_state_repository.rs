//! SQLite implementation of `ComponentStateRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::component_state::PhaseId;
use crate::domain::models::{ComponentName, ComponentState};
use crate::domain::ports::ComponentStateRepository;

#[derive(Clone)]
pub struct SqliteComponentStateRepository {
    pool: SqlitePool,
}

impl SqliteComponentStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ComponentStateRow {
    id: String,
    user_id: String,
    component: String,
    phase_id: i64,
    completed: i64,
    last_touched: String,
    last_part: i64,
    next_planned_date: Option<String>,
    task_handle: Option<String>,
}

impl ComponentStateRow {
    fn into_state(self) -> DomainResult<ComponentState> {
        let err = |e: String| DomainError::PersistenceFailure(e);
        Ok(ComponentState {
            id: Uuid::parse_str(&self.id).map_err(|e| err(e.to_string()))?,
            user_id: Uuid::parse_str(&self.user_id).map_err(|e| err(e.to_string()))?,
            component: ComponentName::from_str(&self.component)
                .ok_or_else(|| DomainError::ComponentNotFound(self.component.clone()))?,
            phase_id: PhaseId::from_i32(self.phase_id as i32)
                .ok_or_else(|| err(format!("bad phase_id: {}", self.phase_id)))?,
            completed: self.completed != 0,
            last_touched: DateTime::parse_from_rfc3339(&self.last_touched)
                .map_err(|e| err(e.to_string()))?
                .with_timezone(&Utc),
            last_part: self.last_part as i32,
            next_planned_date: self
                .next_planned_date
                .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
                .transpose()
                .map_err(|e| err(e.to_string()))?,
            task_handle: self
                .task_handle
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .map_err(|e| err(e.to_string()))?,
        })
    }
}

#[async_trait]
impl ComponentStateRepository for SqliteComponentStateRepository {
    async fn store(&self, state: &ComponentState) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO component_states
             (id, user_id, component, phase_id, completed, last_touched, last_part, next_planned_date, task_handle)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(state.id.to_string())
        .bind(state.user_id.to_string())
        .bind(state.component.as_str())
        .bind(state.phase_id.as_i32())
        .bind(state.completed as i32)
        .bind(state.last_touched.to_rfc3339())
        .bind(state.last_part)
        .bind(state.next_planned_date.map(|d| d.to_rfc3339()))
        .bind(state.task_handle.map(|h| h.to_string()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn last_state(&self, user_id: Uuid, component: ComponentName) -> DomainResult<Option<ComponentState>> {
        let row: Option<ComponentStateRow> = sqlx::query_as(
            "SELECT id, user_id, component, phase_id, completed, last_touched, last_part, next_planned_date, task_handle
             FROM component_states
             WHERE user_id = ? AND component = ?
             ORDER BY last_touched DESC, id DESC
             LIMIT 1",
        )
        .bind(user_id.to_string())
        .bind(component.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_state()).transpose()
    }
}
