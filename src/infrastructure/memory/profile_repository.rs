//! In-memory profile and token repositories.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::store::MemoryStore;
use crate::domain::entities::{NewProfile, Profile, Role};
use crate::domain::repositories::{ApiToken, ProfileRepository, RoleCounts, TokenRepository};
use crate::error::AppError;

pub struct MemoryProfileRepository {
    store: MemoryStore,
}

impl MemoryProfileRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn create(&self, new_profile: NewProfile) -> Result<Profile, AppError> {
        self.store
            .try_write(|tables| {
                let taken = tables
                    .profiles
                    .values()
                    .any(|p| p.email.eq_ignore_ascii_case(&new_profile.email));
                if taken {
                    return Err(AppError::conflict(
                        "Unique constraint violation",
                        json!({ "constraint": "profiles_email_key" }),
                    ));
                }

                let profile = Profile {
                    id: tables.next_id(),
                    email: new_profile.email,
                    name: new_profile.name,
                    role: new_profile.role,
                    created_at: Utc::now(),
                };
                tables.profiles.insert(profile.id, profile.clone());
                Ok(profile)
            })
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Profile>, AppError> {
        Ok(self.store.read(|t| t.profiles.get(&id).cloned()).await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        Ok(self
            .store
            .read(|t| {
                t.profiles
                    .values()
                    .find(|p| p.email.eq_ignore_ascii_case(email))
                    .cloned()
            })
            .await)
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<Profile>, AppError> {
        Ok(self
            .store
            .read(|t| {
                t.profiles
                    .values()
                    .filter(|p| role.is_none_or(|r| r == p.role))
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<Profile, AppError> {
        self.store
            .try_write(|tables| {
                let profile = tables
                    .profiles
                    .get_mut(&id)
                    .ok_or_else(|| AppError::not_found("Profile not found", json!({ "profile_id": id })))?;
                profile.role = role;
                Ok(profile.clone())
            })
            .await
    }

    async fn count_by_role(&self) -> Result<RoleCounts, AppError> {
        Ok(self
            .store
            .read(|t| {
                let mut counts = RoleCounts::default();
                for profile in t.profiles.values() {
                    counts.add(profile.role, 1);
                }
                counts
            })
            .await)
    }
}

pub struct MemoryTokenRepository {
    store: MemoryStore,
}

impl MemoryTokenRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn find_profile_by_hash(&self, token_hash: &str) -> Result<Option<Profile>, AppError> {
        Ok(self
            .store
            .read(|t| {
                t.tokens
                    .values()
                    .find(|token| token.token_hash == token_hash && token.is_active())
                    .and_then(|token| t.profiles.get(&token.profile_id))
                    .cloned()
            })
            .await)
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        self.store
            .write(|t| {
                let now = Utc::now();
                for token in t.tokens.values_mut() {
                    if token.token_hash == token_hash && token.is_active() {
                        token.last_used_at = Some(now);
                    }
                }
            })
            .await;

        Ok(())
    }

    async fn create_token(
        &self,
        profile_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        self.store
            .try_write(|tables| {
                tables.require_profile(profile_id)?;
                if tables
                    .tokens
                    .values()
                    .any(|t| t.name == name || t.token_hash == token_hash)
                {
                    return Err(AppError::conflict(
                        "Unique constraint violation",
                        json!({ "constraint": "api_tokens_name_key" }),
                    ));
                }

                let token = ApiToken {
                    id: tables.next_id(),
                    profile_id,
                    name: name.to_string(),
                    token_hash: token_hash.to_string(),
                    created_at: Utc::now(),
                    last_used_at: None,
                    revoked_at: None,
                };
                tables.tokens.insert(token.id, token.clone());
                Ok(token)
            })
            .await
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self
            .store
            .read(|t| t.tokens.values().rev().cloned().collect())
            .await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        Ok(self.store.read(|t| t.tokens.get(&id).cloned()).await)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .store
            .read(|t| t.tokens.values().find(|token| token.name == name).cloned())
            .await)
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        self.store
            .try_write(|tables| {
                let token = tables
                    .tokens
                    .get_mut(&id)
                    .ok_or_else(|| AppError::not_found("Token not found", json!({ "token_id": id })))?;
                token.revoked_at.get_or_insert_with(Utc::now);
                Ok(())
            })
            .await
    }
}
