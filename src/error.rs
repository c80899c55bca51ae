//! Error types for whittle.
//!
//! The simplification core is built from total functions: degenerate
//! geometry (zero-area faces, coincident vertices, singular quadrics) is
//! handled by local fallbacks and never surfaced as an error. [`MeshError`]
//! exists for caller contract violations detected at the build boundary.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while constructing a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The per-corner attribute streams disagree in length.
    ///
    /// Every input corner must carry a position, a UV, and a normal; a mesh
    /// source lacking real attributes is expected to substitute defaults
    /// rather than omit entries.
    #[error("attribute stream length mismatch: {positions} positions, {uvs} uvs, {normals} normals")]
    AttributeMismatch {
        /// Number of corner positions supplied.
        positions: usize,
        /// Number of corner UVs supplied.
        uvs: usize,
        /// Number of corner normals supplied.
        normals: usize,
    },
}
