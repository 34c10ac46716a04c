//! Repository port for users and their delivery preferences.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{User, UserPreferences};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> DomainResult<User>;

    async fn get_preferences(&self, user_id: Uuid) -> DomainResult<UserPreferences>;

    async fn insert_user(&self, user: &User, preferences: &UserPreferences) -> DomainResult<()>;

    /// Overwrite a user's quit date (the relapse dialog may reset it).
    async fn set_quit_date(&self, user_id: Uuid, quit_date: chrono::NaiveDate) -> DomainResult<()>;

    async fn list_user_ids(&self) -> DomainResult<Vec<Uuid>>;
}
