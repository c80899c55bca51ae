//! Tombstoned arena storage for mesh elements.
//!
//! The mesh is three flat arrays (vertices, edges, faces) that
//! cross-reference each other by index. Elements are never physically
//! removed: deletion sets a tombstone flag and leaves the slot in place, so
//! indices stay valid for the life of the mesh and no renumbering ever
//! occurs. The edge-collapse loop depends on this: heap entries and
//! affected-edge lists hold indices that must survive arbitrary interleaved
//! deletions.
//!
//! # Structure
//!
//! - [`Vertex`] carries position, shading attributes, and the accumulated
//!   error quadric.
//! - [`Face`] holds three vertex indices and the plane equation of its
//!   *original* geometry (computed once at build time, never refreshed).
//! - [`Edge`] is an undirected vertex pair with its cached collapse cost,
//!   target position, and a dirty flag for lazy revalidation.

use nalgebra::{Point3, Vector2, Vector3, Vector4};

use super::index::{EdgeId, FaceId, VertexId};
use crate::quadric::{face_plane, Quadric};

/// A vertex in the mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position. Overwritten when a collapse lands here.
    pub position: Point3<f64>,

    /// The vertex normal, as given by the mesh source. Informational;
    /// not updated after build.
    pub normal: Vector3<f64>,

    /// Texture coordinates. Interpolated toward the removed endpoint on
    /// collapse.
    pub uv: Vector2<f64>,

    /// Vertex color (RGBA). Interpolated like the UV.
    pub color: Vector4<f64>,

    /// Accumulated quadric: the sum of fundamental quadrics of the live
    /// faces incident to this vertex.
    pub quadric: Quadric,

    /// Tombstone flag.
    pub deleted: bool,
}

impl Vertex {
    /// Create a live vertex with a zero quadric and opaque white color.
    pub fn new(position: Point3<f64>, normal: Vector3<f64>, uv: Vector2<f64>) -> Self {
        Self {
            position,
            normal,
            uv,
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            quadric: Quadric::zero(),
            deleted: false,
        }
    }
}

/// A triangle in the mesh.
#[derive(Debug, Clone)]
pub struct Face {
    /// First vertex index.
    pub a: VertexId,
    /// Second vertex index.
    pub b: VertexId,
    /// Third vertex index.
    pub c: VertexId,

    /// Plane equation `[nx, ny, nz, d]` with unit normal, captured from the
    /// corner positions at construction and never recomputed.
    pub plane: Vector4<f64>,

    /// Tombstone flag.
    pub deleted: bool,
}

impl Face {
    /// Create a face and compute its plane from the corner positions.
    pub fn new(
        a: VertexId,
        b: VertexId,
        c: VertexId,
        pa: &Point3<f64>,
        pb: &Point3<f64>,
        pc: &Point3<f64>,
    ) -> Self {
        Self {
            a,
            b,
            c,
            plane: face_plane(pa, pb, pc),
            deleted: false,
        }
    }

    /// The three vertex indices in order.
    pub fn vertices(&self) -> [VertexId; 3] {
        [self.a, self.b, self.c]
    }

    /// Whether the face references the given vertex.
    pub fn contains(&self, v: VertexId) -> bool {
        self.a == v || self.b == v || self.c == v
    }

    /// Whether any two corners coincide.
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b || self.b == self.c || self.c == self.a
    }
}

/// An undirected edge between two vertices.
#[derive(Debug, Clone)]
pub struct Edge {
    /// First endpoint. The collapse survivor.
    pub v1: VertexId,
    /// Second endpoint. Tombstoned by a collapse.
    pub v2: VertexId,

    /// Cached QEM error of the best contraction of this edge.
    pub cost: f64,

    /// Where `v1` lands when this edge is contracted.
    pub optimal_position: Point3<f64>,

    /// Set when an endpoint was involved in another collapse, meaning the
    /// cached cost can no longer be trusted.
    pub dirty: bool,

    /// Tombstone flag.
    pub deleted: bool,
}

impl Edge {
    /// Create an edge with an uncomputed cost.
    pub fn new(v1: VertexId, v2: VertexId) -> Self {
        Self {
            v1,
            v2,
            cost: 0.0,
            optimal_position: Point3::origin(),
            dirty: false,
            deleted: false,
        }
    }

    /// Whether the edge has the given vertex as an endpoint.
    pub fn touches(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// Order-independent endpoint pair, for deduplication.
    pub(crate) fn key(&self) -> (usize, usize) {
        let (a, b) = (self.v1.index(), self.v2.index());
        (a.min(b), a.max(b))
    }
}

/// An arena-based triangle mesh with tombstoned deletion.
///
/// Built from a triangle soup by [`build_from_soup`](super::build_from_soup)
/// and mutated exclusively through the simplification scheduler.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face>,
    pub(crate) deleted_vertices: usize,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Accessors ====================

    /// Total number of vertex slots, tombstoned included.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Total number of edge slots, tombstoned included.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Total number of face slots, tombstoned included.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of tombstoned vertices.
    #[inline]
    pub fn deleted_vertex_count(&self) -> usize {
        self.deleted_vertices
    }

    /// Number of live vertices.
    #[inline]
    pub fn live_vertex_count(&self) -> usize {
        self.vertices.len() - self.deleted_vertices
    }

    /// Number of live edges. O(E).
    pub fn live_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| !e.deleted).count()
    }

    /// Number of live faces. O(F).
    pub fn live_face_count(&self) -> usize {
        self.faces.iter().filter(|f| !f.deleted).count()
    }

    /// Get a vertex by id.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by id.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get an edge by id.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Get a mutable edge by id.
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    /// Get a face by id.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get a mutable face by id.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.index()]
    }

    // ==================== Iteration ====================

    /// Iterate over live vertices with their ids.
    pub fn live_vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.deleted)
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over live edges with their ids.
    pub fn live_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.deleted)
            .map(|(i, e)| (EdgeId::new(i), e))
    }

    /// Iterate over live faces with their ids.
    pub fn live_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.deleted)
            .map(|(i, f)| (FaceId::new(i), f))
    }

    // ==================== Validation ====================

    /// Check the structural invariants of the arena.
    ///
    /// Verifies that the tombstone counter agrees with the flags, that every
    /// live face has three pairwise-distinct live vertices, that every live
    /// edge has two distinct live endpoints, and that no two live edges
    /// connect the same vertex pair. Intended for tests and debugging; O(V +
    /// E + F) with a hash set over the edges.
    pub fn validate(&self) -> bool {
        let flagged = self.vertices.iter().filter(|v| v.deleted).count();
        if flagged != self.deleted_vertices {
            return false;
        }

        let vertex_live = |id: VertexId| {
            id.index() < self.vertices.len() && !self.vertices[id.index()].deleted
        };

        for face in self.faces.iter().filter(|f| !f.deleted) {
            if face.is_degenerate() {
                return false;
            }
            if !face.vertices().into_iter().all(|id| vertex_live(id)) {
                return false;
            }
        }

        let mut seen = std::collections::HashSet::new();
        for edge in self.edges.iter().filter(|e| !e.deleted) {
            if edge.v1 == edge.v2 {
                return false;
            }
            if !vertex_live(edge.v1) || !vertex_live(edge.v2) {
                return false;
            }
            if !seen.insert(edge.key()) {
                return false;
            }
        }

        true
    }

    // ==================== Snapshot ====================

    /// Capture the current live surface for rendering.
    ///
    /// Vertex attribute arrays cover every slot (tombstoned slots keep their
    /// last value but are referenced by no triangle), so the index triples
    /// of live faces remain valid without any renumbering. Only consistent
    /// between simplification steps.
    pub fn snapshot(&self) -> MeshSnapshot {
        let positions = self
            .vertices
            .iter()
            .map(|v| {
                [
                    v.position.x as f32,
                    v.position.y as f32,
                    v.position.z as f32,
                ]
            })
            .collect();
        let uvs = self
            .vertices
            .iter()
            .map(|v| [v.uv.x as f32, v.uv.y as f32])
            .collect();
        let colors = self
            .vertices
            .iter()
            .map(|v| {
                [
                    v.color.x as f32,
                    v.color.y as f32,
                    v.color.z as f32,
                    v.color.w as f32,
                ]
            })
            .collect();

        let indices = self
            .faces
            .iter()
            .filter(|f| !f.deleted)
            .map(|f| {
                [
                    f.a.index() as u32,
                    f.b.index() as u32,
                    f.c.index() as u32,
                ]
            })
            .collect();

        MeshSnapshot {
            positions,
            uvs,
            colors,
            indices,
        }
    }
}

/// Contiguous vertex and index buffers for the live surface, suitable for
/// direct GPU upload.
#[derive(Debug, Clone)]
pub struct MeshSnapshot {
    /// Per-slot positions.
    pub positions: Vec<[f32; 3]>,
    /// Per-slot texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Per-slot RGBA colors.
    pub colors: Vec<[f32; 4]>,
    /// Index triples of live faces only.
    pub indices: Vec<[u32; 3]>,
}

impl MeshSnapshot {
    /// Number of live triangles in the snapshot.
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Mesh {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];

        let mut mesh = Mesh::new();
        for p in &positions {
            mesh.vertices
                .push(Vertex::new(*p, Vector3::z(), Vector2::zeros()));
        }
        mesh.faces.push(Face::new(
            VertexId::new(0),
            VertexId::new(1),
            VertexId::new(2),
            &positions[0],
            &positions[1],
            &positions[2],
        ));
        for (a, b) in [(0, 1), (1, 2), (0, 2)] {
            mesh.edges
                .push(Edge::new(VertexId::new(a), VertexId::new(b)));
        }
        mesh
    }

    #[test]
    fn test_face_plane_from_corners() {
        let mesh = triangle_mesh();
        let face = mesh.face(FaceId::new(0));
        assert!((face.plane - Vector4::new(0.0, 0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_counts_and_validation() {
        let mesh = triangle_mesh();
        assert_eq!(mesh.live_vertex_count(), 3);
        assert_eq!(mesh.live_edge_count(), 3);
        assert_eq!(mesh.live_face_count(), 1);
        assert!(mesh.validate());
    }

    #[test]
    fn test_tombstone_counter_mismatch_detected() {
        let mut mesh = triangle_mesh();
        mesh.vertices[1].deleted = true;
        // Counter not bumped: invariant broken.
        assert!(!mesh.validate());

        mesh.deleted_vertices = 1;
        // Now the face references a dead vertex: still invalid.
        assert!(!mesh.validate());
    }

    #[test]
    fn test_duplicate_live_edge_detected() {
        let mut mesh = triangle_mesh();
        mesh.edges
            .push(Edge::new(VertexId::new(1), VertexId::new(0)));
        assert!(!mesh.validate());
    }

    #[test]
    fn test_snapshot_skips_dead_faces() {
        let mut mesh = triangle_mesh();
        let second = [
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        mesh.vertices
            .push(Vertex::new(second[0], Vector3::z(), Vector2::zeros()));
        mesh.faces.push(Face::new(
            VertexId::new(3),
            VertexId::new(1),
            VertexId::new(2),
            &second[0],
            &second[1],
            &second[2],
        ));

        mesh.faces[0].deleted = true;
        let snapshot = mesh.snapshot();

        assert_eq!(snapshot.triangle_count(), 1);
        assert_eq!(snapshot.indices[0], [3, 1, 2]);
        // Attribute arrays still cover every slot.
        assert_eq!(snapshot.positions.len(), 4);
        assert_eq!(snapshot.uvs.len(), 4);
        assert_eq!(snapshot.colors.len(), 4);
    }
}
