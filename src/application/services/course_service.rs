//! Course CRUD and cached course tree reads.

use serde_json::json;
use std::sync::Arc;

use crate::application::access::{can_view, ensure_author, ensure_can_manage};
use crate::domain::entities::{Course, CoursePatch, CourseTree, NewCourse, Profile, Role};
use crate::domain::repositories::{CourseFilter, CourseRepository, CourseSummary};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Service for course records and whole course trees.
///
/// Tree reads go through the cache; every write invalidates the cached tree
/// of the course it touched.
pub struct CourseService<C: CourseRepository + ?Sized = dyn CourseRepository> {
    courses: Arc<C>,
    cache: Arc<dyn CacheService>,
}

fn course_not_found(id: i64) -> AppError {
    AppError::not_found("Course not found", json!({ "course_id": id }))
}

impl<C: CourseRepository + ?Sized> CourseService<C> {
    pub fn new(courses: Arc<C>, cache: Arc<dyn CacheService>) -> Self {
        Self { courses, cache }
    }

    /// Lists courses visible to `actor`. Students only ever see published
    /// courses, whatever filter they pass.
    pub async fn list(
        &self,
        actor: &Profile,
        mut filter: CourseFilter,
    ) -> Result<Vec<CourseSummary>, AppError> {
        if actor.role == Role::Student {
            filter.status = CourseFilter::published().status;
        }

        self.courses.list(filter).await
    }

    /// Loads a course with its sections and content.
    ///
    /// Drafts are reported as missing to students.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the course does not exist or is not
    /// visible to `actor`.
    pub async fn get_tree(&self, actor: &Profile, id: i64) -> Result<CourseTree, AppError> {
        let cached = self.cache.get_tree(id).await.unwrap_or_else(|e| {
            tracing::warn!(course_id = id, error = %e, "Cache read failed");
            None
        });

        let tree = match cached {
            Some(tree) => tree,
            None => {
                let tree = self
                    .courses
                    .find_tree(id)
                    .await?
                    .ok_or_else(|| course_not_found(id))?;
                if let Err(e) = self.cache.set_tree(&tree, None).await {
                    tracing::warn!(course_id = id, error = %e, "Cache fill failed");
                }
                tree
            }
        };

        if !can_view(actor, &tree.course) {
            return Err(course_not_found(id));
        }

        Ok(tree)
    }

    /// Loads a course the actor is allowed to modify, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the course does not exist.
    /// Returns [`AppError::Forbidden`] if `actor` may not manage it.
    pub async fn get_managed(&self, actor: &Profile, id: i64) -> Result<Course, AppError> {
        let course = self
            .courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| course_not_found(id))?;
        ensure_can_manage(actor, &course)?;
        Ok(course)
    }

    /// Creates a course. Staff authors become its instructor unless one is
    /// given explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for students.
    /// Returns [`AppError::Validation`] if the instructor does not exist.
    pub async fn create(&self, actor: &Profile, mut new_course: NewCourse) -> Result<Course, AppError> {
        ensure_author(actor)?;

        if actor.role == Role::Staff && new_course.instructor_id.is_none() {
            new_course.instructor_id = Some(actor.id);
        }

        let course = self.courses.create(new_course).await?;

        tracing::info!(course_id = course.id, actor_id = actor.id, "Course created");

        Ok(course)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the course does not exist.
    /// Returns [`AppError::Forbidden`] if `actor` may not manage it.
    pub async fn update(
        &self,
        actor: &Profile,
        id: i64,
        patch: CoursePatch,
    ) -> Result<Course, AppError> {
        let current = self.get_managed(actor, id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let course = self.courses.update(id, patch).await?;
        self.invalidate(id).await;

        tracing::info!(course_id = id, actor_id = actor.id, "Course updated");

        Ok(course)
    }

    /// Deletes a course and everything below it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the course does not exist.
    /// Returns [`AppError::Forbidden`] if `actor` may not manage it.
    pub async fn delete(&self, actor: &Profile, id: i64) -> Result<(), AppError> {
        self.get_managed(actor, id).await?;
        self.courses.delete(id).await?;
        self.invalidate(id).await;

        tracing::info!(course_id = id, actor_id = actor.id, "Course deleted");

        Ok(())
    }

    async fn invalidate(&self, id: i64) {
        if let Err(e) = self.cache.invalidate_course(id).await {
            tracing::warn!(course_id = id, error = %e, "Cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CourseStatus;
    use crate::domain::repositories::MockCourseRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService, NullCache};
    use chrono::Utc;

    fn profile(id: i64, role: Role) -> Profile {
        Profile {
            id,
            email: format!("{id}@example.com"),
            name: "P".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    fn course(id: i64, status: CourseStatus, instructor_id: Option<i64>) -> Course {
        let now = Utc::now();
        Course {
            id,
            title: "Rust".to_string(),
            description: String::new(),
            instructor_id,
            status,
            enrollment_fee: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_students_list_published_only() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo
            .expect_list()
            .withf(|filter| filter.status == Some(CourseStatus::Published))
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(NullCache::new()));

        let filter = CourseFilter {
            status: Some(CourseStatus::Draft),
            instructor_id: None,
        };
        service
            .list(&profile(1, Role::Student), filter)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_tree_uses_cache_hit() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo.expect_find_tree().never();

        let mut mock_cache = MockCacheService::new();
        mock_cache.expect_get_tree().times(1).returning(|id| {
            Ok(Some(CourseTree {
                course: course(id, CourseStatus::Published, None),
                sections: vec![],
            }))
        });

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let tree = service
            .get_tree(&profile(1, Role::Student), 4)
            .await
            .unwrap();
        assert_eq!(tree.course.id, 4);
    }

    #[tokio::test]
    async fn test_get_tree_miss_populates_cache() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo.expect_find_tree().times(1).returning(|id| {
            Ok(Some(CourseTree {
                course: course(id, CourseStatus::Draft, None),
                sections: vec![],
            }))
        });

        let mut mock_cache = MockCacheService::new();
        mock_cache.expect_get_tree().returning(|_| Ok(None));
        mock_cache
            .expect_set_tree()
            .withf(|tree, ttl| tree.course.id == 4 && ttl.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let tree = service.get_tree(&profile(1, Role::Staff), 4).await.unwrap();
        assert_eq!(tree.course.status, CourseStatus::Draft);
    }

    #[tokio::test]
    async fn test_get_tree_survives_cache_errors() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo.expect_find_tree().times(1).returning(|id| {
            Ok(Some(CourseTree {
                course: course(id, CourseStatus::Published, None),
                sections: vec![],
            }))
        });

        let mut mock_cache = MockCacheService::new();
        mock_cache
            .expect_get_tree()
            .returning(|_| Err(CacheError::ConnectionError("refused".to_string())));
        mock_cache
            .expect_set_tree()
            .times(1)
            .returning(|_, _| Err(CacheError::OperationError("read only".to_string())));

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let tree = service
            .get_tree(&profile(1, Role::Student), 4)
            .await
            .unwrap();
        assert_eq!(tree.course.id, 4);
    }

    #[tokio::test]
    async fn test_draft_hidden_from_students() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo.expect_find_tree().returning(|id| {
            Ok(Some(CourseTree {
                course: course(id, CourseStatus::Draft, None),
                sections: vec![],
            }))
        });

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(NullCache::new()));

        let result = service.get_tree(&profile(1, Role::Student), 4).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_staff_become_instructor_on_create() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo
            .expect_create()
            .withf(|new_course| new_course.instructor_id == Some(3))
            .times(1)
            .returning(|new_course| {
                Ok(course(10, new_course.status, new_course.instructor_id))
            });

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(NullCache::new()));

        let created = service
            .create(
                &profile(3, Role::Staff),
                NewCourse {
                    title: "Rust".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.instructor_id, Some(3));
    }

    #[tokio::test]
    async fn test_students_cannot_create() {
        let mock_repo = MockCourseRepository::new();
        let service = CourseService::new(Arc::new(mock_repo), Arc::new(NullCache::new()));

        let result = service
            .create(&profile(3, Role::Student), NewCourse::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_update_invalidates_cache() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(course(id, CourseStatus::Draft, Some(3)))));
        mock_repo
            .expect_update()
            .times(1)
            .returning(|id, _| Ok(course(id, CourseStatus::Published, Some(3))));

        let mut mock_cache = MockCacheService::new();
        mock_cache
            .expect_invalidate_course()
            .withf(|id| *id == 8)
            .times(1)
            .returning(|_| Ok(()));

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let updated = service
            .update(
                &profile(3, Role::Staff),
                8,
                CoursePatch {
                    status: Some(CourseStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_published());
    }

    #[tokio::test]
    async fn test_update_of_foreign_course_is_forbidden() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(course(id, CourseStatus::Draft, Some(99)))));
        mock_repo.expect_update().never();

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(NullCache::new()));

        let result = service
            .update(
                &profile(3, Role::Staff),
                8,
                CoursePatch {
                    title: Some("Mine now".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_course() {
        let mut mock_repo = MockCourseRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_delete().never();

        let service = CourseService::new(Arc::new(mock_repo), Arc::new(NullCache::new()));

        let result = service.delete(&profile(1, Role::Admin), 8).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
