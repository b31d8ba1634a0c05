//! Shared types and rules for the soil assessment pipeline
//!
//! Everything here is pure: the backend, the WASM bindings and the tests all
//! use the same feature schema, heuristic estimator, confidence scoring and
//! recommendation text.

pub mod geometry;
pub mod heuristics;
pub mod models;
pub mod recommendation;
pub mod types;
pub mod validation;

pub use geometry::*;
pub use heuristics::*;
pub use models::*;
pub use recommendation::*;
pub use types::*;
pub use validation::*;
