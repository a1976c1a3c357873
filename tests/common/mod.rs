#![allow(dead_code)]

use axum::{Router, routing::get};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

use course_studio::application::services::EditorSettings;
use course_studio::api::handlers::health_handler;
use course_studio::domain::draft::OrderingPolicy;
use course_studio::domain::entities::{NewProfile, Profile, Role};
use course_studio::domain::repositories::{ProfileRepository, TokenRepository};
use course_studio::infrastructure::cache::NullCache;
use course_studio::infrastructure::memory::{
    MemoryProfileRepository, MemoryStore, MemoryTokenRepository,
};
use course_studio::routes::api_router;
use course_studio::state::{AppState, ServiceSettings};
use course_studio::utils::token::hash_token;

pub const SIGNING_SECRET: &str = "test-signing-secret";

/// A seeded profile and the raw bearer token that authenticates as it.
#[derive(Debug, Clone)]
pub struct Actor {
    pub profile: Profile,
    pub token: String,
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: MemoryStore,
    pub admin: Actor,
    pub staff: Actor,
    pub other_staff: Actor,
    pub student: Actor,
}

pub fn test_settings(policy: OrderingPolicy) -> ServiceSettings {
    ServiceSettings {
        token_signing_secret: SIGNING_SECRET.to_string(),
        editor: EditorSettings {
            policy,
            idle_ttl: Duration::from_secs(3600),
            max_sessions: 10,
            max_sessions_per_owner: 5,
        },
    }
}

pub async fn seed_actor(store: &MemoryStore, email: &str, role: Role) -> Actor {
    let profiles = MemoryProfileRepository::new(store.clone());
    let tokens = MemoryTokenRepository::new(store.clone());

    let profile = profiles
        .create(NewProfile {
            email: email.to_string(),
            name: email.split('@').next().unwrap().to_string(),
            role,
        })
        .await
        .unwrap();

    let token = format!("token-for-{}", profile.id);
    tokens
        .create_token(profile.id, email, &hash_token(SIGNING_SECRET, &token))
        .await
        .unwrap();

    Actor { profile, token }
}

/// Builds the router the server uses, minus rate limiting and tracing,
/// over a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(OrderingPolicy::Preserve).await
}

pub async fn spawn_app_with(policy: OrderingPolicy) -> TestApp {
    let store = MemoryStore::new();

    let admin = seed_actor(&store, "admin@example.com", Role::Admin).await;
    let staff = seed_actor(&store, "staff@example.com", Role::Staff).await;
    let other_staff = seed_actor(&store, "other@example.com", Role::Staff).await;
    let student = seed_actor(&store, "student@example.com", Role::Student).await;

    let state = AppState::memory(store.clone(), Arc::new(NullCache::new()), test_settings(policy));

    let app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router(state.clone()))
        .with_state(state.clone());

    TestApp {
        server: TestServer::new(app).unwrap(),
        state,
        store,
        admin,
        staff,
        other_staff,
        student,
    }
}

/// Creates a course over the API and returns its JSON.
pub async fn create_course(app: &TestApp, actor: &Actor, body: Value) -> Value {
    let response = app
        .server
        .post("/api/courses")
        .authorization_bearer(&actor.token)
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

pub async fn create_section(app: &TestApp, actor: &Actor, course_id: i64, title: &str) -> Value {
    let response = app
        .server
        .post(&format!("/api/courses/{course_id}/sections"))
        .authorization_bearer(&actor.token)
        .json(&json!({ "title": title }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

pub async fn create_content(app: &TestApp, actor: &Actor, section_id: i64, body: Value) -> Value {
    let response = app
        .server
        .post(&format!("/api/sections/{section_id}/content"))
        .authorization_bearer(&actor.token)
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

/// Renders an identity JSON object as the `{kind}/{id}` URL segment.
pub fn node_path(identity: &Value) -> String {
    match identity["state"].as_str() {
        Some("pending") => format!("pending/{}", identity["local_id"]),
        Some("persisted") => format!("persisted/{}", identity["remote_id"]),
        other => panic!("not an identity: {other:?}"),
    }
}
