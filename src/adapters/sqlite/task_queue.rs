//! SQLite-backed outbox implementation of the delayed task queue (spec
//! §4.3, §9 "Scheduling coupled to persistence" design note).
//!
//! `schedule` writes the row first and arms an in-process timer second.
//! A background reconciler re-arms anything still `pending` past its
//! `eta` — covering process restarts, since the registry itself performs
//! no rehydration of in-flight tasks (spec §4.5).

use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::task_queue::TaskHandle;
use crate::domain::ports::{TaskQueue, TriggerSink};

#[derive(Clone)]
pub struct SqliteTaskQueue {
    pool: SqlitePool,
    trigger_sink: std::sync::Arc<dyn TriggerSink>,
}

impl SqliteTaskQueue {
    pub fn new(pool: SqlitePool, trigger_sink: std::sync::Arc<dyn TriggerSink>) -> Self {
        Self { pool, trigger_sink }
    }

    /// Re-arm every row still `pending` in the store. Called once at
    /// startup; covers the case where the process restarted between a
    /// task being persisted and it firing.
    pub async fn initialize_from_store(&self) -> DomainResult<()> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, user_id, trigger, eta FROM scheduled_tasks WHERE status = 'pending'",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut armed = 0;
        for (id, user_id, trigger, eta) in rows {
            let (Ok(id), Ok(user_id)) = (Uuid::parse_str(&id), Uuid::parse_str(&user_id)) else {
                continue;
            };
            let Ok(eta) = DateTime::parse_from_rfc3339(&eta) else {
                continue;
            };
            self.arm(id, user_id, trigger, eta.with_timezone(&Utc));
            armed += 1;
        }
        info!(count = armed, "re-armed pending scheduled tasks from store");
        Ok(())
    }

    /// Scan for overdue `pending` rows and fire them. A backstop for tasks
    /// whose in-process timer was lost without the row being claimed.
    pub async fn run_reconciler(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.reconcile_once().await {
                warn!(error = %e, "reconciler pass failed");
            }
        }
    }

    async fn reconcile_once(&self) -> DomainResult<()> {
        let now = Utc::now().to_rfc3339();
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT id, user_id, trigger FROM scheduled_tasks WHERE status = 'pending' AND eta <= ?",
        )
        .bind(&now)
        .fetch_all(&self.pool)
        .await?;

        for (id, user_id, trigger) in rows {
            let (Ok(id), Ok(user_id)) = (Uuid::parse_str(&id), Uuid::parse_str(&user_id)) else {
                continue;
            };
            self.try_fire(id, user_id, trigger).await;
        }
        Ok(())
    }

    fn arm(&self, id: Uuid, user_id: Uuid, trigger: String, eta: DateTime<Utc>) {
        let this = self.clone();
        tokio::spawn(async move {
            let now = Utc::now();
            if eta > now {
                if let Ok(d) = (eta - now).to_std() {
                    tokio::time::sleep(d).await;
                }
            }
            this.try_fire(id, user_id, trigger).await;
        });
    }

    /// Atomically claim a pending row, deliver with retry, and record the
    /// outcome. A no-op if the row was already claimed (fired or
    /// canceled) by another path — this is the de-dup against a
    /// cancel-vs-fire race (spec §5).
    async fn try_fire(&self, id: Uuid, user_id: Uuid, trigger: String) {
        let claimed = match sqlx::query("UPDATE scheduled_tasks SET status = 'firing' WHERE id = ? AND status = 'pending'")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
        {
            Ok(result) => result.rows_affected() == 1,
            Err(e) => {
                warn!(error = %e, task_id = %id, "failed to claim scheduled task");
                false
            }
        };
        if !claimed {
            return;
        }

        let sink = self.trigger_sink.clone();
        let backoff_policy = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(300)),
            ..ExponentialBackoff::default()
        };
        let outcome = backoff::future::retry(backoff_policy, || {
            let sink = sink.clone();
            let trigger = trigger.clone();
            async move {
                sink.send(user_id, &trigger)
                    .await
                    .map_err(backoff::Error::transient)
            }
        })
        .await;

        match outcome {
            Ok(()) => {
                let _ = sqlx::query("UPDATE scheduled_tasks SET status = 'fired', fired_at = ? WHERE id = ?")
                    .bind(Utc::now().to_rfc3339())
                    .bind(id.to_string())
                    .execute(&self.pool)
                    .await;
            }
            Err(e) => {
                warn!(error = %e, task_id = %id, "delivery exhausted retries, leaving pending for reconciler");
                let _ = sqlx::query("UPDATE scheduled_tasks SET status = 'pending' WHERE id = ?")
                    .bind(id.to_string())
                    .execute(&self.pool)
                    .await;
            }
        }
    }
}

#[async_trait]
impl TaskQueue for SqliteTaskQueue {
    async fn schedule(&self, trigger: &str, user_id: Uuid, eta: DateTime<Utc>) -> DomainResult<TaskHandle> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO scheduled_tasks (id, user_id, trigger, eta, status, created_at) VALUES (?, ?, ?, ?, 'pending', ?)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(trigger)
        .bind(eta.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::ScheduleFailure(e.to_string()))?;

        self.arm(id, user_id, trigger.to_string(), eta);
        Ok(id)
    }

    async fn schedule_now(&self, trigger: &str, user_id: Uuid) -> DomainResult<TaskHandle> {
        self.schedule(trigger, user_id, Utc::now()).await
    }

    async fn cancel(&self, handle: TaskHandle) -> DomainResult<()> {
        sqlx::query("UPDATE scheduled_tasks SET status = 'canceled' WHERE id = ? AND status = 'pending'")
            .bind(handle.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::ScheduleFailure(e.to_string()))?;
        Ok(())
    }
}
