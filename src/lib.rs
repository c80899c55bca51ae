//! # Whittle
//!
//! Progressive triangle mesh simplification using quadric error metrics.
//!
//! Whittle takes the unindexed triangle soup a mesh decoder typically
//! produces, welds it into a topological mesh, and then contracts edges in
//! order of geometric error (Garland & Heckbert, SIGGRAPH 1997) a bounded
//! number at a time, so a host application can render each intermediate
//! level of detail as the mesh coarsens.
//!
//! The crate is the simplification *core* only: file decoding, GPU upload,
//! and windowing belong to the host. Input is per-corner position/UV/normal
//! streams; output is a [`MeshSnapshot`](mesh::MeshSnapshot) of contiguous
//! vertex and index buffers.
//!
//! ## Quick Start
//!
//! ```
//! use whittle::prelude::*;
//! use nalgebra::{Point3, Vector2, Vector3};
//!
//! // Two triangles sharing the diagonal of a unit square, unrolled the way
//! // a decoder emits them: three corners per triangle, duplicates and all.
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let uvs = vec![Vector2::zeros(); 6];
//! let normals = vec![Vector3::z(); 6];
//!
//! let mesh = build_from_soup(&positions, &uvs, &normals)?;
//! assert_eq!(mesh.live_vertex_count(), 4);
//! assert_eq!(mesh.live_face_count(), 2);
//! assert_eq!(mesh.live_edge_count(), 5);
//!
//! // Collapse one edge, then pull buffers for the renderer.
//! let mut simplifier = Simplifier::new(mesh);
//! let collapsed = simplifier.step(1);
//! assert_eq!(collapsed, 1);
//!
//! let snapshot = simplifier.mesh().snapshot();
//! assert!(snapshot.triangle_count() <= 2);
//! # Ok::<(), whittle::MeshError>(())
//! ```
//!
//! ## Driving Simplification
//!
//! [`Simplifier::step`](simplify::Simplifier::step) takes an explicit
//! collapse budget and reports how many collapses actually happened; `0`
//! means the mesh cannot be simplified further. The default policy
//! ([`step_default`](simplify::Simplifier::step_default)) collapses one
//! percent of the original vertex count per call, which keeps per-frame
//! work roughly proportional to mesh size.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod mesh;
pub mod progress;
pub mod quadric;
pub mod simplify;

/// Prelude module for convenient imports.
///
/// ```
/// use whittle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_soup, build_from_soup_with_progress, Edge, EdgeId, Face, FaceId, Mesh,
        MeshSnapshot, Vertex, VertexId,
    };
    pub use crate::progress::Progress;
    pub use crate::quadric::{compute_all_quadrics, Quadric};
    pub use crate::simplify::{Simplifier, SimplifyOptions, SimplifyStats};
}

pub use error::{MeshError, Result};

// Re-export nalgebra types for convenience
pub use nalgebra;
