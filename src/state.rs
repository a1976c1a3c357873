//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    AuthService, ContentService, CourseService, DashboardService, EditorService, EditorSettings,
    ProfileService,
};
use crate::domain::repositories::{
    ContentRepository, CourseRepository, ProfileRepository, QuizQuestionRepository,
    SectionRepository, TokenRepository,
};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::memory::{
    MemoryContentRepository, MemoryCourseRepository, MemoryProfileRepository,
    MemoryQuizQuestionRepository, MemorySectionRepository, MemoryStore, MemoryTokenRepository,
};
use crate::infrastructure::persistence::{
    PgContentRepository, PgCourseRepository, PgProfileRepository, PgQuizQuestionRepository,
    PgSectionRepository, PgTokenRepository,
};

/// Where course data lives.
#[derive(Clone)]
pub enum StorageBackend {
    Postgres(Arc<PgPool>),
    Memory(MemoryStore),
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Postgres(_) => "postgres",
            StorageBackend::Memory(_) => "memory",
        }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        match self {
            StorageBackend::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool.as_ref()).await?;
                Ok(())
            }
            StorageBackend::Memory(_) => Ok(()),
        }
    }
}

/// Service settings that do not depend on the backend.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub token_signing_secret: String,
    pub editor: EditorSettings,
}

struct Repositories {
    courses: Arc<dyn CourseRepository>,
    sections: Arc<dyn SectionRepository>,
    content: Arc<dyn ContentRepository>,
    questions: Arc<dyn QuizQuestionRepository>,
    profiles: Arc<dyn ProfileRepository>,
    tokens: Arc<dyn TokenRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub course_service: Arc<CourseService>,
    pub content_service: Arc<ContentService>,
    pub editor_service: Arc<EditorService>,
    pub dashboard_service: Arc<DashboardService>,
    pub profile_service: Arc<ProfileService>,
    pub cache: Arc<dyn CacheService>,
    pub storage: StorageBackend,
}

impl AppState {
    /// Wires the PostgreSQL repositories.
    pub fn postgres(
        pool: Arc<PgPool>,
        cache: Arc<dyn CacheService>,
        settings: ServiceSettings,
    ) -> Self {
        let repos = Repositories {
            courses: Arc::new(PgCourseRepository::new(pool.clone())),
            sections: Arc::new(PgSectionRepository::new(pool.clone())),
            content: Arc::new(PgContentRepository::new(pool.clone())),
            questions: Arc::new(PgQuizQuestionRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            tokens: Arc::new(PgTokenRepository::new(pool.clone())),
        };

        Self::build(repos, cache, settings, StorageBackend::Postgres(pool))
    }

    /// Wires the in-process repositories over `store`.
    pub fn memory(store: MemoryStore, cache: Arc<dyn CacheService>, settings: ServiceSettings) -> Self {
        let repos = Repositories {
            courses: Arc::new(MemoryCourseRepository::new(store.clone())),
            sections: Arc::new(MemorySectionRepository::new(store.clone())),
            content: Arc::new(MemoryContentRepository::new(store.clone())),
            questions: Arc::new(MemoryQuizQuestionRepository::new(store.clone())),
            profiles: Arc::new(MemoryProfileRepository::new(store.clone())),
            tokens: Arc::new(MemoryTokenRepository::new(store.clone())),
        };

        Self::build(repos, cache, settings, StorageBackend::Memory(store))
    }

    fn build(
        repos: Repositories,
        cache: Arc<dyn CacheService>,
        settings: ServiceSettings,
        storage: StorageBackend,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(repos.tokens, settings.token_signing_secret)),
            course_service: Arc::new(CourseService::new(repos.courses.clone(), cache.clone())),
            content_service: Arc::new(ContentService::new(
                repos.courses.clone(),
                repos.sections,
                repos.content,
                repos.questions,
                cache.clone(),
            )),
            editor_service: Arc::new(EditorService::new(
                repos.courses.clone(),
                cache.clone(),
                settings.editor,
            )),
            dashboard_service: Arc::new(DashboardService::new(repos.courses, repos.profiles.clone())),
            profile_service: Arc::new(ProfileService::new(repos.profiles)),
            cache,
            storage,
        }
    }
}
