//! Domain layer containing business entities and logic.
//!
//! This module implements the core domain logic following Clean Architecture principles.
//! It defines entities, the course editing model, and repository interfaces
//! independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`draft`] - Locally edited course trees with pending/persisted node identities
//! - [`reconcile`] - Computing the writes a draft needs on save
//! - [`repositories`] - Data access trait definitions
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Save Flow
//!
//! 1. An editing session mutates its [`draft::CourseDraft`]
//! 2. [`reconcile::plan_save`] validates the draft and builds a [`reconcile::SavePlan`]
//! 3. [`repositories::CourseRepository::save_tree`] applies the plan atomically
//! 4. The returned [`reconcile::SaveOutcome`] promotes pending nodes to persisted ones

pub mod draft;
pub mod entities;
pub mod reconcile;
pub mod repositories;
