//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Request types convert into the domain's `New*` and
//! `*Patch` types via `From`.

pub mod course;
pub mod editor;
pub mod health;
pub mod profile;
pub mod question;
pub mod section;
