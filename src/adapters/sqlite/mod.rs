//! SQLite-backed adapters for every persistence port, plus the startup
//! helper that wires pool creation, migrations, and catalog seeding
//! together for the composition root.

pub mod component_repository;
pub mod component_state_repository;
pub mod connection;
pub mod controller_state_repository;
pub mod migrations;
pub mod task_queue;
pub mod user_repository;

pub use component_repository::SqliteComponentRepository;
pub use component_state_repository::SqliteComponentStateRepository;
pub use connection::{create_pool, create_test_pool, ConnectionError, PoolConfig};
pub use controller_state_repository::SqliteControllerStateRepository;
pub use migrations::{all_embedded_migrations, MigrationError, Migrator};
pub use task_queue::SqliteTaskQueue;
pub use user_repository::SqliteUserRepository;

use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("catalog seed failed: {0}")]
    Seed(#[from] crate::domain::errors::DomainError),
}

/// Open the pool, run pending migrations, and seed the component catalog.
/// Called once from the composition root before any repository is used.
pub async fn bootstrap(database_url: &str) -> Result<SqlitePool, StartupError> {
    let pool = create_pool(database_url, None).await?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    SqliteComponentRepository::new(pool.clone()).seed_catalog().await?;
    Ok(pool)
}
