//! Shared types and models for the AutoPeças Manager platform
//!
//! This crate contains the domain model, common API types and pure
//! validation helpers used by the backend server and its test suites.
//! It performs no I/O of its own.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
