//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    add_draft_lesson_handler, add_draft_section_handler, close_session_handler,
    content_list_handler, course_detail_handler, course_list_handler, create_content_handler,
    create_course_handler, create_profile_handler, create_question_handler,
    create_section_handler, dashboard_handler, delete_content_handler, delete_course_handler,
    delete_draft_lesson_handler, delete_draft_section_handler, delete_question_handler,
    delete_section_handler, me_handler, open_session_handler, profile_list_handler,
    question_list_handler, replace_draft_lesson_handler, save_session_handler,
    section_list_handler, session_detail_handler, update_content_handler, update_course_handler,
    update_draft_section_handler, update_question_handler, update_role_handler,
    update_section_handler, update_session_course_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// Courses and their rows:
///
/// - `GET    /courses`                      - List courses visible to the caller
/// - `POST   /courses`                      - Create a course
/// - `GET    /courses/{id}`                 - Course with sections and content
/// - `PATCH  /courses/{id}`                 - Update course fields
/// - `DELETE /courses/{id}`                 - Delete a course and everything below it
/// - `GET    /courses/{id}/sections`        - List sections
/// - `POST   /courses/{id}/sections`        - Create a section
/// - `PATCH  /sections/{id}`                - Update a section
/// - `DELETE /sections/{id}`                - Delete a section
/// - `GET    /sections/{id}/content`        - List content items
/// - `POST   /sections/{id}/content`        - Create a content item
/// - `PATCH  /content/{id}`                 - Update a content item
/// - `DELETE /content/{id}`                 - Delete a content item
/// - `GET    /content/{id}/questions`       - List quiz questions
/// - `POST   /content/{id}/questions`       - Add a quiz question
/// - `PATCH  /questions/{id}`               - Update a quiz question
/// - `DELETE /questions/{id}`               - Delete a quiz question
///
/// Editor sessions (`{node}` is `pending/{local_id}` or `persisted/{id}`):
///
/// - `POST   /editor/sessions`                                    - Open a session
/// - `GET    /editor/sessions/{sid}`                              - Current draft
/// - `PATCH  /editor/sessions/{sid}`                              - Edit course fields
/// - `DELETE /editor/sessions/{sid}`                              - Discard the session
/// - `POST   /editor/sessions/{sid}/sections`                     - Add a section
/// - `PATCH  /editor/sessions/{sid}/sections/{node}`              - Edit a section
/// - `DELETE /editor/sessions/{sid}/sections/{node}`              - Remove a section
/// - `POST   /editor/sessions/{sid}/sections/{node}/lessons`      - Add a lesson
/// - `PUT    /editor/sessions/{sid}/sections/{node}/lessons/{node}` - Replace a lesson
/// - `DELETE /editor/sessions/{sid}/sections/{node}/lessons/{node}` - Remove a lesson
/// - `POST   /editor/sessions/{sid}/save`                         - Persist the draft
///
/// Profiles:
///
/// - `GET    /me`                   - Current profile
/// - `GET    /dashboard`            - Role-specific dashboard
/// - `GET    /profiles`             - List profiles (admin)
/// - `POST   /profiles`             - Register a profile (admin)
/// - `PATCH  /profiles/{id}/role`   - Change a role (admin)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses",
            get(course_list_handler).post(create_course_handler),
        )
        .route(
            "/courses/{id}",
            get(course_detail_handler)
                .patch(update_course_handler)
                .delete(delete_course_handler),
        )
        .route(
            "/courses/{id}/sections",
            get(section_list_handler).post(create_section_handler),
        )
        .route(
            "/sections/{id}",
            patch(update_section_handler).delete(delete_section_handler),
        )
        .route(
            "/sections/{id}/content",
            get(content_list_handler).post(create_content_handler),
        )
        .route(
            "/content/{id}",
            patch(update_content_handler).delete(delete_content_handler),
        )
        .route(
            "/content/{id}/questions",
            get(question_list_handler).post(create_question_handler),
        )
        .route(
            "/questions/{id}",
            patch(update_question_handler).delete(delete_question_handler),
        )
        .merge(editor_routes())
        .route("/me", get(me_handler))
        .route("/dashboard", get(dashboard_handler))
        .route(
            "/profiles",
            get(profile_list_handler).post(create_profile_handler),
        )
        .route("/profiles/{id}/role", patch(update_role_handler))
}

fn editor_routes() -> Router<AppState> {
    Router::new()
        .route("/editor/sessions", post(open_session_handler))
        .route(
            "/editor/sessions/{sid}",
            get(session_detail_handler)
                .patch(update_session_course_handler)
                .delete(close_session_handler),
        )
        .route(
            "/editor/sessions/{sid}/sections",
            post(add_draft_section_handler),
        )
        .route(
            "/editor/sessions/{sid}/sections/{kind}/{id}",
            patch(update_draft_section_handler).delete(delete_draft_section_handler),
        )
        .route(
            "/editor/sessions/{sid}/sections/{kind}/{id}/lessons",
            post(add_draft_lesson_handler),
        )
        .route(
            "/editor/sessions/{sid}/sections/{kind}/{id}/lessons/{lkind}/{lid}",
            put(replace_draft_lesson_handler).delete(delete_draft_lesson_handler),
        )
        .route("/editor/sessions/{sid}/save", post(save_session_handler))
}
