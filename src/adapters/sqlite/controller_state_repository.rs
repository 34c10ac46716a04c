//! SQLite implementation of `ControllerStateRepository`.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ControllerState, PhaseStateTag};
use crate::domain::ports::ControllerStateRepository;

#[derive(Clone)]
pub struct SqliteControllerStateRepository {
    pool: SqlitePool,
}

impl SqliteControllerStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ControllerStateRow {
    user_id: String,
    phase: String,
    execution_week: Option<i64>,
}

impl ControllerStateRow {
    fn into_state(self) -> DomainResult<ControllerState> {
        Ok(ControllerState {
            user_id: Uuid::parse_str(&self.user_id).map_err(|e| DomainError::PersistenceFailure(e.to_string()))?,
            phase: PhaseStateTag::from_str(&self.phase)
                .ok_or_else(|| DomainError::PersistenceFailure(format!("bad phase: {}", self.phase)))?,
            execution_week: self.execution_week.map(|w| w as u32),
        })
    }
}

#[async_trait]
impl ControllerStateRepository for SqliteControllerStateRepository {
    async fn current_phase_state(&self, user_id: Uuid) -> DomainResult<ControllerState> {
        let row: Option<ControllerStateRow> =
            sqlx::query_as("SELECT user_id, phase, execution_week FROM controller_states WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.ok_or(DomainError::UserNotFound(user_id))?.into_state()
    }

    async fn set_phase_state(&self, user_id: Uuid, phase: PhaseStateTag) -> DomainResult<()> {
        let result = sqlx::query("UPDATE controller_states SET phase = ? WHERE user_id = ?")
            .bind(phase.as_str())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user_id));
        }
        Ok(())
    }

    async fn execution_week(&self, user_id: Uuid) -> DomainResult<Option<u32>> {
        Ok(self.current_phase_state(user_id).await?.execution_week)
    }

    async fn set_execution_week(&self, user_id: Uuid, week: u32) -> DomainResult<()> {
        let result = sqlx::query("UPDATE controller_states SET execution_week = ? WHERE user_id = ?")
            .bind(week as i64)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user_id));
        }
        Ok(())
    }

    async fn create(&self, state: &ControllerState) -> DomainResult<()> {
        sqlx::query("INSERT INTO controller_states (user_id, phase, execution_week) VALUES (?, ?, ?)")
            .bind(state.user_id.to_string())
            .bind(state.phase.as_str())
            .bind(state.execution_week.map(|w| w as i64))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> DomainResult<Vec<ControllerState>> {
        let rows: Vec<ControllerStateRow> =
            sqlx::query_as("SELECT user_id, phase, execution_week FROM controller_states")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(|r| r.into_state()).collect()
    }
}
