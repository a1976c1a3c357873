use sqlx::PgPool;
use std::sync::Arc;

use course_studio::domain::entities::{NewProfile, Profile, Role};
use course_studio::domain::repositories::{ProfileRepository, TokenRepository};
use course_studio::error::AppError;
use course_studio::infrastructure::persistence::{PgProfileRepository, PgTokenRepository};

async fn seed_profile(pool: &Arc<PgPool>, email: &str) -> Profile {
    PgProfileRepository::new(pool.clone())
        .create(NewProfile {
            email: email.to_string(),
            name: "Tester".to_string(),
            role: Role::Staff,
        })
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_token(pool: PgPool) {
    let pool = Arc::new(pool);
    let profile = seed_profile(&pool, "t@example.com").await;
    let repo = PgTokenRepository::new(pool);

    let token = repo
        .create_token(profile.id, "test-token", "hash123")
        .await
        .unwrap();

    assert_eq!(token.name, "test-token");
    assert_eq!(token.token_hash, "hash123");
    assert_eq!(token.profile_id, profile.id);
    assert!(token.is_active());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_token_resolves_to_profile(pool: PgPool) {
    let pool = Arc::new(pool);
    let profile = seed_profile(&pool, "owner@example.com").await;
    let repo = PgTokenRepository::new(pool);

    repo.create_token(profile.id, "valid-token", "validhash")
        .await
        .unwrap();

    let found = repo.find_profile_by_hash("validhash").await.unwrap();
    assert_eq!(found, Some(profile));

    assert_eq!(repo.find_profile_by_hash("nonexistent").await.unwrap(), None);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_revoked_token_does_not_authenticate(pool: PgPool) {
    let pool = Arc::new(pool);
    let profile = seed_profile(&pool, "r@example.com").await;
    let repo = PgTokenRepository::new(pool);

    let token = repo
        .create_token(profile.id, "revoked-token", "revokedhash")
        .await
        .unwrap();
    repo.revoke_token(token.id).await.unwrap();

    assert_eq!(repo.find_profile_by_hash("revokedhash").await.unwrap(), None);

    // Revoking twice keeps the first timestamp and succeeds.
    repo.revoke_token(token.id).await.unwrap();
    let stored = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(!stored.is_active());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_last_used(pool: PgPool) {
    let pool = Arc::new(pool);
    let profile = seed_profile(&pool, "u@example.com").await;
    let repo = PgTokenRepository::new(pool.clone());

    let token = repo
        .create_token(profile.id, "update-token", "updatehash")
        .await
        .unwrap();
    repo.update_last_used("updatehash").await.unwrap();

    let last_used: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT last_used_at FROM api_tokens WHERE id = $1")
            .bind(token.id)
            .fetch_one(pool.as_ref())
            .await
            .unwrap();

    assert!(last_used.is_some());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_name_and_list(pool: PgPool) {
    let pool = Arc::new(pool);
    let profile = seed_profile(&pool, "l@example.com").await;
    let repo = PgTokenRepository::new(pool);

    repo.create_token(profile.id, "token1", "hash1").await.unwrap();
    repo.create_token(profile.id, "token2", "hash2").await.unwrap();

    let found = repo.find_by_name("token2").await.unwrap().unwrap();
    assert_eq!(found.token_hash, "hash2");

    let tokens = repo.list_tokens().await.unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].name, "token2");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_revoke_unknown_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let result = repo.revoke_token(424242).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}
