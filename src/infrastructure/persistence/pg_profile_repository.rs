//! PostgreSQL implementation of profile repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{PROFILE_COLUMNS, ProfileRow, convert_all};
use crate::domain::entities::{NewProfile, Profile, Role};
use crate::domain::repositories::{ProfileRepository, RoleCounts};
use crate::error::AppError;

pub struct PgProfileRepository {
    pool: Arc<PgPool>,
}

impl PgProfileRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn create(&self, new_profile: NewProfile) -> Result<Profile, AppError> {
        let sql = format!(
            "INSERT INTO profiles (email, name, role) VALUES ($1, $2, $3) \
             RETURNING {PROFILE_COLUMNS}"
        );
        let row: ProfileRow = sqlx::query_as(&sql)
            .bind(&new_profile.email)
            .bind(&new_profile.name)
            .bind(new_profile.role.as_str())
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Profile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE LOWER(email) = LOWER($1)");
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<Profile>, AppError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles \
             WHERE ($1::text IS NULL OR role = $1) \
             ORDER BY id"
        );
        let rows: Vec<ProfileRow> = sqlx::query_as(&sql)
            .bind(role.map(|r| r.as_str()))
            .fetch_all(self.pool.as_ref())
            .await?;

        convert_all(rows)
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<Profile, AppError> {
        let sql = format!("UPDATE profiles SET role = $2 WHERE id = $1 RETURNING {PROFILE_COLUMNS}");
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| AppError::not_found("Profile not found", json!({ "profile_id": id })))?
            .try_into()
    }

    async fn count_by_role(&self) -> Result<RoleCounts, AppError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM profiles GROUP BY role")
                .fetch_all(self.pool.as_ref())
                .await?;

        let mut counts = RoleCounts::default();
        for (role, count) in rows {
            counts.add(role.parse()?, count);
        }

        Ok(counts)
    }
}
