//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::CourseService`] - Course CRUD and cached course tree reads
//! - [`services::ContentService`] - Sections, content items and quiz questions
//! - [`services::EditorService`] - Editing sessions and atomic course saves
//! - [`services::DashboardService`] - Role-specific dashboard data
//! - [`services::ProfileService`] - Profile administration
//! - [`services::AuthService`] - API token authentication
//!
//! Role checks live in [`access`].

pub mod access;
pub mod services;
