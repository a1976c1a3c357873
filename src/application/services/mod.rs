//! Business logic services for the application layer.

pub mod auth_service;
pub mod content_service;
pub mod course_service;
pub mod dashboard_service;
pub mod editor_service;
pub mod profile_service;

pub use auth_service::AuthService;
pub use content_service::ContentService;
pub use course_service::CourseService;
pub use dashboard_service::{Dashboard, DashboardService};
pub use editor_service::{EditorService, EditorSettings, SaveReport, SectionEdit, SessionSnapshot};
pub use profile_service::ProfileService;
