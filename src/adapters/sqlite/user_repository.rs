//! SQLite implementation of `UserRepository`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::user::{weekday_from_str, weekday_to_str};
use crate::domain::models::{ActivityGroup, DayPart, User, UserPreferences};
use crate::domain::ports::UserRepository;

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    start_date: String,
    quit_date: String,
    activity_group: String,
}

impl UserRow {
    fn into_user(self) -> DomainResult<User> {
        Ok(User {
            id: Uuid::parse_str(&self.id).map_err(|e| DomainError::PersistenceFailure(e.to_string()))?,
            start_date: NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d")
                .map_err(|e| DomainError::PersistenceFailure(e.to_string()))?,
            quit_date: NaiveDate::parse_from_str(&self.quit_date, "%Y-%m-%d")
                .map_err(|e| DomainError::PersistenceFailure(e.to_string()))?,
            activity_group: ActivityGroup::from_str(&self.activity_group)
                .ok_or_else(|| DomainError::PersistenceFailure(format!("bad activity_group: {}", self.activity_group)))?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PreferencesRow {
    user_id: String,
    preferred_weekday: String,
    preferred_daypart: String,
}

impl PreferencesRow {
    fn into_preferences(self) -> DomainResult<UserPreferences> {
        Ok(UserPreferences {
            user_id: Uuid::parse_str(&self.user_id).map_err(|e| DomainError::PersistenceFailure(e.to_string()))?,
            preferred_weekday: weekday_from_str(&self.preferred_weekday)
                .ok_or_else(|| DomainError::PersistenceFailure(format!("bad weekday: {}", self.preferred_weekday)))?,
            preferred_daypart: DayPart::from_str(&self.preferred_daypart)
                .ok_or_else(|| DomainError::PersistenceFailure(format!("bad daypart: {}", self.preferred_daypart)))?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_user(&self, id: Uuid) -> DomainResult<User> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, start_date, quit_date, activity_group FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(DomainError::UserNotFound(id))?.into_user()
    }

    async fn get_preferences(&self, user_id: Uuid) -> DomainResult<UserPreferences> {
        let row: Option<PreferencesRow> = sqlx::query_as(
            "SELECT user_id, preferred_weekday, preferred_daypart FROM user_preferences WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(DomainError::UserNotFound(user_id))?.into_preferences()
    }

    async fn insert_user(&self, user: &User, preferences: &UserPreferences) -> DomainResult<()> {
        sqlx::query("INSERT INTO users (id, start_date, quit_date, activity_group) VALUES (?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(user.start_date.format("%Y-%m-%d").to_string())
            .bind(user.quit_date.format("%Y-%m-%d").to_string())
            .bind(user.activity_group.as_str())
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "INSERT INTO user_preferences (user_id, preferred_weekday, preferred_daypart) VALUES (?, ?, ?)",
        )
        .bind(preferences.user_id.to_string())
        .bind(weekday_to_str(preferences.preferred_weekday))
        .bind(preferences.preferred_daypart.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_quit_date(&self, user_id: Uuid, quit_date: NaiveDate) -> DomainResult<()> {
        let result = sqlx::query("UPDATE users SET quit_date = ? WHERE id = ?")
            .bind(quit_date.format("%Y-%m-%d").to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user_id));
        }
        Ok(())
    }

    async fn list_user_ids(&self) -> DomainResult<Vec<Uuid>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM users").fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|(id,)| Uuid::parse_str(&id).map_err(|e| DomainError::PersistenceFailure(e.to_string())))
            .collect()
    }
}
