//! Course editing sessions.
//!
//! An editing session owns one [`CourseDraft`]. All structural edits stay in
//! the session until [`EditorService::save`] turns the draft into a save
//! plan and hands it to the repository as one atomic write.
//!
//! Sessions live in a registry owned by the service. Each session sits
//! behind its own async mutex, so requests against one session are
//! serialized while different sessions proceed independently. A request
//! that was queued on a session's lock when the session was closed sees it
//! as gone. Idle sessions expire after the configured TTL; expiry is checked
//! whenever the registry is touched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;

use crate::application::access::{ensure_author, ensure_can_manage};
use crate::domain::draft::{
    CourseDraft, CourseFields, DraftError, Identity, LessonInput, OrderingPolicy, SectionDraft,
};
use crate::domain::entities::{CoursePatch, Profile, Role};
use crate::domain::reconcile::{SaveSummary, plan_save};
use crate::domain::repositories::CourseRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::session_id::{generate_session_id, is_valid_session_id};

/// Registry limits and draft behaviour.
#[derive(Debug, Clone, Copy)]
pub struct EditorSettings {
    pub policy: OrderingPolicy,
    pub idle_ttl: Duration,
    pub max_sessions: usize,
    pub max_sessions_per_owner: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            policy: OrderingPolicy::default(),
            idle_ttl: Duration::from_secs(3600),
            max_sessions: 1000,
            max_sessions_per_owner: 20,
        }
    }
}

struct EditorSession {
    id: String,
    owner_id: i64,
    draft: CourseDraft,
    opened_at: DateTime<Utc>,
    last_access: Instant,
    closed: bool,
}

impl EditorSession {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            course: self.draft.identity(),
            fields: self.draft.fields().clone(),
            sections: self.draft.sections().to_vec(),
            ordering_policy: self.draft.policy(),
            pending_changes: self.draft.pending_changes(),
            removed_sections: self.draft.removed_sections().to_vec(),
            removed_lessons: self.draft.removed_lessons().to_vec(),
            opened_at: self.opened_at,
        }
    }
}

/// Serializable view of a session's draft.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub course: Identity,
    pub fields: CourseFields,
    pub sections: Vec<SectionDraft>,
    pub ordering_policy: OrderingPolicy,
    pub pending_changes: usize,
    pub removed_sections: Vec<i64>,
    pub removed_lessons: Vec<i64>,
    pub opened_at: DateTime<Utc>,
}

/// Result of a successful save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub course_id: i64,
    pub summary: SaveSummary,
    pub session: SessionSnapshot,
}

/// Partial section edit. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct SectionEdit {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

type SessionHandle = Arc<Mutex<EditorSession>>;

struct RegisteredSession {
    owner_id: i64,
    handle: SessionHandle,
}

pub struct EditorService<C: CourseRepository + ?Sized = dyn CourseRepository> {
    courses: Arc<C>,
    cache: Arc<dyn CacheService>,
    settings: EditorSettings,
    sessions: RwLock<HashMap<String, RegisteredSession>>,
}

fn session_not_found(id: &str) -> AppError {
    AppError::not_found("Editor session not found", json!({ "session_id": id }))
}

impl<C: CourseRepository + ?Sized> EditorService<C> {
    pub fn new(courses: Arc<C>, cache: Arc<dyn CacheService>, settings: EditorSettings) -> Self {
        Self {
            courses,
            cache,
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a session on a stored course, or on a new course when
    /// `course_id` is `None`. `initial` is applied to the course fields.
    ///
    /// New courses opened by staff get the caller as instructor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] if `actor` may not edit the course.
    /// Returns [`AppError::NotFound`] if the course does not exist.
    /// Returns [`AppError::Conflict`] when the global or the per-profile
    /// session limit is reached.
    pub async fn open(
        &self,
        actor: &Profile,
        course_id: Option<i64>,
        initial: CoursePatch,
    ) -> Result<SessionSnapshot, AppError> {
        ensure_author(actor)?;

        let mut draft = match course_id {
            Some(id) => {
                let tree = self.courses.find_tree(id).await?.ok_or_else(|| {
                    AppError::not_found("Course not found", json!({ "course_id": id }))
                })?;
                ensure_can_manage(actor, &tree.course)?;
                CourseDraft::from_tree(&tree, self.settings.policy)
            }
            None => {
                let fields = CourseFields {
                    instructor_id: (actor.role == Role::Staff).then_some(actor.id),
                    ..Default::default()
                };
                CourseDraft::new(fields, self.settings.policy)
            }
        };
        draft.update_course(initial);

        self.purge_expired().await;

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.settings.max_sessions {
            return Err(AppError::conflict(
                "Too many open editor sessions",
                json!({ "max_sessions": self.settings.max_sessions }),
            ));
        }

        let owned = sessions.values().filter(|s| s.owner_id == actor.id).count();
        if owned >= self.settings.max_sessions_per_owner {
            return Err(AppError::conflict(
                "Too many open editor sessions for this profile",
                json!({ "max_sessions_per_owner": self.settings.max_sessions_per_owner }),
            ));
        }

        let session = EditorSession {
            id: generate_session_id(),
            owner_id: actor.id,
            draft,
            opened_at: Utc::now(),
            last_access: Instant::now(),
            closed: false,
        };
        let snapshot = session.snapshot();
        sessions.insert(
            session.id.clone(),
            RegisteredSession {
                owner_id: actor.id,
                handle: Arc::new(Mutex::new(session)),
            },
        );

        tracing::info!(
            session_id = %snapshot.session_id,
            actor_id = actor.id,
            course = %snapshot.course,
            "Editor session opened"
        );
        metrics::counter!("editor_sessions_opened_total").increment(1);

        Ok(snapshot)
    }

    pub async fn get(&self, actor: &Profile, session_id: &str) -> Result<SessionSnapshot, AppError> {
        let session = self.checkout(actor, session_id).await?;
        Ok(session.snapshot())
    }

    /// Discards a session and its unsaved edits.
    pub async fn close(&self, actor: &Profile, session_id: &str) -> Result<(), AppError> {
        let mut session = self.checkout(actor, session_id).await?;
        session.closed = true;
        self.sessions.write().await.remove(session_id);
        drop(session);

        tracing::info!(session_id, actor_id = actor.id, "Editor session closed");

        Ok(())
    }

    pub async fn update_course(
        &self,
        actor: &Profile,
        session_id: &str,
        patch: CoursePatch,
    ) -> Result<SessionSnapshot, AppError> {
        let mut session = self.checkout(actor, session_id).await?;
        session.draft.update_course(patch);
        Ok(session.snapshot())
    }

    /// Appends a "New Section" and returns its pending identity.
    pub async fn add_section(
        &self,
        actor: &Profile,
        session_id: &str,
    ) -> Result<(Identity, SessionSnapshot), AppError> {
        let mut session = self.checkout(actor, session_id).await?;
        let identity = session.draft.add_section();
        Ok((identity, session.snapshot()))
    }

    pub async fn update_section(
        &self,
        actor: &Profile,
        session_id: &str,
        section: Identity,
        edit: SectionEdit,
    ) -> Result<SessionSnapshot, AppError> {
        let mut session = self.checkout(actor, session_id).await?;
        if session.draft.section(section).is_none() {
            return Err(DraftError::SectionNotFound(section).into());
        }

        if let Some(title) = edit.title {
            session.draft.update_section_title(section, title)?;
        }
        if let Some(description) = edit.description {
            session.draft.set_section_description(section, description)?;
        }

        Ok(session.snapshot())
    }

    pub async fn delete_section(
        &self,
        actor: &Profile,
        session_id: &str,
        section: Identity,
    ) -> Result<SessionSnapshot, AppError> {
        let mut session = self.checkout(actor, session_id).await?;
        session.draft.delete_section(section)?;
        Ok(session.snapshot())
    }

    /// Merges lesson editor output into a section; see
    /// [`CourseDraft::edit_lesson`].
    pub async fn edit_lesson(
        &self,
        actor: &Profile,
        session_id: &str,
        section: Identity,
        lesson: Option<Identity>,
        input: LessonInput,
    ) -> Result<(Identity, SessionSnapshot), AppError> {
        let mut session = self.checkout(actor, session_id).await?;
        let identity = session.draft.edit_lesson(section, lesson, input)?;
        Ok((identity, session.snapshot()))
    }

    pub async fn delete_lesson(
        &self,
        actor: &Profile,
        session_id: &str,
        section: Identity,
        lesson: Identity,
    ) -> Result<SessionSnapshot, AppError> {
        let mut session = self.checkout(actor, session_id).await?;
        session.draft.delete_lesson(section, lesson)?;
        Ok(session.snapshot())
    }

    /// Persists the session's draft.
    ///
    /// The draft is validated first; nothing is written when validation
    /// fails. The repository applies the whole plan atomically. On success
    /// pending nodes become persisted; on failure the draft is left exactly
    /// as it was.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid draft and any
    /// repository error unchanged.
    pub async fn save(&self, actor: &Profile, session_id: &str) -> Result<SaveReport, AppError> {
        let mut session = self.checkout(actor, session_id).await?;

        let plan = plan_save(&session.draft).inspect_err(|e| {
            tracing::info!(session_id, error = %e, "Draft rejected before save");
        })?;
        let summary = plan.summary();

        let outcome = match self.courses.save_tree(&plan).await {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics::counter!("course_saves_total", "result" => "error").increment(1);
                tracing::warn!(
                    session_id,
                    course = %session.draft.identity(),
                    error = %e,
                    "Course save failed"
                );
                return Err(e);
            }
        };

        session.draft.mark_saved(&outcome);
        if let Err(e) = self.cache.invalidate_course(outcome.course_id).await {
            tracing::warn!(course_id = outcome.course_id, error = %e, "Cache invalidation failed");
        }

        metrics::counter!("course_saves_total", "result" => "ok").increment(1);
        tracing::info!(
            session_id,
            course_id = outcome.course_id,
            sections_created = summary.sections_created,
            sections_updated = summary.sections_updated,
            sections_deleted = summary.sections_deleted,
            lessons_created = summary.lessons_created,
            lessons_updated = summary.lessons_updated,
            lessons_deleted = summary.lessons_deleted,
            "Course saved"
        );

        Ok(SaveReport {
            course_id: outcome.course_id,
            summary,
            session: session.snapshot(),
        })
    }

    /// Number of live sessions, expired ones excluded.
    pub async fn session_count(&self) -> usize {
        self.purge_expired().await;
        self.sessions.read().await.len()
    }

    async fn checkout(
        &self,
        actor: &Profile,
        session_id: &str,
    ) -> Result<OwnedMutexGuard<EditorSession>, AppError> {
        if !is_valid_session_id(session_id) {
            return Err(session_not_found(session_id));
        }

        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .map(|s| Arc::clone(&s.handle))
            .ok_or_else(|| session_not_found(session_id))?;

        let mut session = handle.lock_owned().await;

        if session.closed {
            return Err(session_not_found(session_id));
        }

        if session.is_expired(self.settings.idle_ttl) {
            session.closed = true;
            drop(session);
            self.sessions.write().await.remove(session_id);
            tracing::debug!(session_id, "Editor session expired");
            return Err(session_not_found(session_id));
        }

        if session.owner_id != actor.id {
            return Err(AppError::forbidden(
                "Editor session belongs to another profile",
                json!({ "session_id": session_id }),
            ));
        }

        session.last_access = Instant::now();
        Ok(session)
    }

    /// Drops expired sessions. Sessions locked by a running request are in
    /// use and therefore kept.
    async fn purge_expired(&self) {
        let ttl = self.settings.idle_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, entry| match entry.handle.try_lock() {
            Ok(mut session) if session.is_expired(ttl) => {
                session.closed = true;
                false
            }
            _ => true,
        });

        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Expired editor sessions removed");
        }
    }
}
