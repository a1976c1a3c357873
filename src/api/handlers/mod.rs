//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.
//! Authenticated handlers receive the caller as `Extension<Profile>`.

pub mod courses;
pub mod editor;
pub mod health;
pub mod profiles;
pub mod sections;

pub use courses::{
    course_detail_handler, course_list_handler, create_course_handler, delete_course_handler,
    update_course_handler,
};
pub use editor::{
    add_draft_lesson_handler, add_draft_section_handler, close_session_handler,
    delete_draft_lesson_handler, delete_draft_section_handler, open_session_handler,
    replace_draft_lesson_handler, save_session_handler, session_detail_handler,
    update_draft_section_handler, update_session_course_handler,
};
pub use health::health_handler;
pub use profiles::{
    create_profile_handler, dashboard_handler, me_handler, profile_list_handler,
    update_role_handler,
};
pub use sections::{
    content_list_handler, create_content_handler, create_question_handler,
    create_section_handler, delete_content_handler, delete_question_handler,
    delete_section_handler, question_list_handler, section_list_handler, update_content_handler,
    update_question_handler, update_section_handler,
};
