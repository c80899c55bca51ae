//! Core mesh data structures and construction.
//!
//! This module provides the arena-based triangle mesh used by the
//! simplification core, along with the welding builder that produces it
//! from unindexed triangle soup.
//!
//! # Overview
//!
//! The primary type is [`Mesh`]: three flat arrays of [`Vertex`], [`Edge`],
//! and [`Face`] records that reference each other by index. Deletion is a
//! tombstone flag, never a removal, so indices held elsewhere (the collapse
//! heap, affected-edge lists) stay valid across arbitrary mutations.
//!
//! # Construction
//!
//! ```
//! use whittle::mesh::build_from_soup;
//! use nalgebra::{Point3, Vector2, Vector3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let uvs = vec![Vector2::zeros(); 3];
//! let normals = vec![Vector3::z(); 3];
//!
//! let mesh = build_from_soup(&positions, &uvs, &normals).unwrap();
//! assert_eq!(mesh.live_vertex_count(), 3);
//! assert_eq!(mesh.live_face_count(), 1);
//! ```

mod arena;
mod builder;
mod index;

pub use arena::{Edge, Face, Mesh, MeshSnapshot, Vertex};
pub use builder::{build_from_soup, build_from_soup_with_progress};
pub use index::{EdgeId, FaceId, VertexId};
