//! Meshweave Core - shared math utilities
//!
//! Tangent-space generation and triangle index traversal used by the
//! asset pipeline.

pub mod math;

pub use math::{generate_tangents, TriangleIndices};
