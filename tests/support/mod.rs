//! Shared scaffolding for the end-to-end controller scenario tests
//! (spec §8). Builds a full in-memory stack — migrated SQLite pool,
//! seeded catalog, a recording trigger sink, and a wired
//! `ControllerRegistry` — the way `main.rs`'s composition root does it,
//! minus the HTTP ingress and background loops.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cadence::adapters::clock::FixedClock;
use cadence::adapters::sqlite::{
    all_embedded_migrations, create_test_pool, Migrator, SqliteComponentRepository, SqliteComponentStateRepository,
    SqliteControllerStateRepository, SqliteTaskQueue, SqliteUserRepository,
};
use cadence::domain::errors::DomainResult;
use cadence::domain::models::ScheduleConfig;
use cadence::domain::ports::TriggerSink;
use cadence::services::registry::{ControllerRegistry, SharedPorts};

/// Records every trigger delivered instead of making an HTTP call.
pub struct RecordingTriggerSink {
    pub sent: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingTriggerSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { sent: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl TriggerSink for RecordingTriggerSink {
    async fn send(&self, user_id: Uuid, trigger: &str) -> DomainResult<()> {
        self.sent.lock().unwrap().push((user_id, trigger.to_string()));
        Ok(())
    }
}

pub struct TestEnv {
    pub registry: Arc<ControllerRegistry>,
    pub component_state_repo: Arc<SqliteComponentStateRepository>,
    pub sink: Arc<RecordingTriggerSink>,
    pub pool: sqlx::SqlitePool,
}

/// Build a fresh in-memory environment with a `FixedClock` at `fixed_now`
/// in the Amsterdam civil zone, and the given per-daypart send hours.
pub async fn build_env(fixed_now: DateTime<Utc>, schedule: ScheduleConfig) -> TestEnv {
    let pool = create_test_pool().await.expect("create in-memory pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("run embedded migrations");
    SqliteComponentRepository::new(pool.clone()).seed_catalog().await.expect("seed component catalog");

    let sink = RecordingTriggerSink::new();
    let task_queue = Arc::new(SqliteTaskQueue::new(pool.clone(), sink.clone()));
    let clock = Arc::new(FixedClock {
        fixed_now,
        zone: chrono_tz::Europe::Amsterdam,
    });

    let component_state_repo = Arc::new(SqliteComponentStateRepository::new(pool.clone()));
    let shared = SharedPorts {
        user_repo: Arc::new(SqliteUserRepository::new(pool.clone())),
        component_repo: Arc::new(SqliteComponentRepository::new(pool.clone())),
        component_state_repo: component_state_repo.clone(),
        controller_state_repo: Arc::new(SqliteControllerStateRepository::new(pool.clone())),
        task_queue,
        clock,
        schedule,
    };

    TestEnv {
        registry: Arc::new(ControllerRegistry::new(shared)),
        component_state_repo,
        sink,
        pool,
    }
}

/// Count persisted rows for a component, across the whole append-only log
/// (not just the latest-wins view `last_state` exposes).
pub async fn count_component_rows(pool: &sqlx::SqlitePool, user_id: Uuid, component: &str) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM component_states WHERE user_id = ? AND component = ?")
        .bind(user_id.to_string())
        .bind(component)
        .fetch_one(pool)
        .await
        .expect("count component rows");
    row.0
}
