//! Utility functions shared by the server and the admin CLI.
//!
//! - [`token`] - API token generation and keyed hashing
//! - [`session_id`] - Editor session identifier generation and validation

pub mod session_id;
pub mod token;
