//! In-process repository implementations.
//!
//! All repositories built from one [`MemoryStore`] share the same tables.
//! The store mirrors the relational schema: foreign keys are checked on
//! insert, deletes cascade, and [`MemoryCourseRepository::save_tree`] applies
//! a plan against a copy of the tables that replaces the original only on
//! success.
//!
//! Selected with `STORAGE_BACKEND=memory`; data is lost on restart.

mod course_repository;
mod profile_repository;
mod store;
mod tree_repositories;

pub use course_repository::MemoryCourseRepository;
pub use profile_repository::{MemoryProfileRepository, MemoryTokenRepository};
pub use store::MemoryStore;
pub use tree_repositories::{
    MemoryContentRepository, MemoryQuizQuestionRepository, MemorySectionRepository,
};
