//! Mesh construction from unindexed triangle soup.
//!
//! Mesh sources deliver geometry as a flat stream of corners, three per
//! triangle, with positions duplicated wherever triangles meet. Building a
//! topological mesh means welding those duplicates back together: corners
//! closer than a tolerance become one vertex, faces are emitted against the
//! welded indices, and the unique undirected edges are extracted for the
//! collapse queue.
//!
//! Welding uses a spatial hash over a fixed grid so each corner is compared
//! only against candidates in its own cell, keeping the pass O(N) for
//! well-distributed input.

use std::collections::{HashMap, HashSet};

use nalgebra::{Point3, Vector2, Vector3};

use super::arena::{Edge, Face, Mesh, Vertex};
use super::index::VertexId;
use crate::error::{MeshError, Result};
use crate::progress::Progress;

/// Spatial hash cell size for welding.
const WELD_GRID: f64 = 1e-3;

/// Corners closer than this to an existing vertex in the same cell are
/// merged into it.
const WELD_EPSILON: f64 = 1e-4;

/// How many corners to weld between progress reports.
const PROGRESS_INTERVAL: usize = 10_000;

fn cell_key(p: &Point3<f64>) -> (i64, i64, i64) {
    (
        (p.x / WELD_GRID).floor() as i64,
        (p.y / WELD_GRID).floor() as i64,
        (p.z / WELD_GRID).floor() as i64,
    )
}

/// Build a mesh from a per-corner triangle stream.
///
/// The three slices run in parallel: corner `i` has position `positions[i]`,
/// texture coordinate `uvs[i]`, and normal `normals[i]`; corners
/// `3t, 3t+1, 3t+2` form triangle `t`. Sources without real UVs or normals
/// must substitute defaults such as `(0, 0)` and `(0, 0, 1)`.
///
/// Corners within the weld tolerance of an already-welded vertex reuse it; the
/// first-seen corner's attributes win. Triangles whose welded corners are no
/// longer pairwise distinct are dropped. Empty input produces an empty mesh,
/// not an error.
///
/// # Errors
/// Returns [`MeshError::AttributeMismatch`] when the slices differ in
/// length.
///
/// # Example
/// ```
/// use whittle::mesh::build_from_soup;
/// use nalgebra::{Point3, Vector2, Vector3};
///
/// // Two triangles sharing the diagonal of a unit square.
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let uvs = vec![Vector2::zeros(); 6];
/// let normals = vec![Vector3::z(); 6];
///
/// let mesh = build_from_soup(&positions, &uvs, &normals).unwrap();
/// assert_eq!(mesh.live_vertex_count(), 4);
/// assert_eq!(mesh.live_face_count(), 2);
/// assert_eq!(mesh.live_edge_count(), 5);
/// ```
pub fn build_from_soup(
    positions: &[Point3<f64>],
    uvs: &[Vector2<f64>],
    normals: &[Vector3<f64>],
) -> Result<Mesh> {
    build_from_soup_with_progress(positions, uvs, normals, &Progress::none())
}

/// [`build_from_soup`] with progress reporting during the welding pass.
pub fn build_from_soup_with_progress(
    positions: &[Point3<f64>],
    uvs: &[Vector2<f64>],
    normals: &[Vector3<f64>],
    progress: &Progress,
) -> Result<Mesh> {
    if positions.len() != uvs.len() || positions.len() != normals.len() {
        return Err(MeshError::AttributeMismatch {
            positions: positions.len(),
            uvs: uvs.len(),
            normals: normals.len(),
        });
    }

    let num_corners = positions.len();
    let mut mesh = Mesh::new();

    // Weld duplicate corners through the spatial hash.
    let mut cells: HashMap<(i64, i64, i64), Vec<VertexId>> = HashMap::new();
    let mut corner_to_vertex: Vec<VertexId> = Vec::with_capacity(num_corners);

    for (i, position) in positions.iter().enumerate() {
        if i % PROGRESS_INTERVAL == 0 && i > 0 {
            progress.report(i, num_corners, "Welding vertices");
        }

        let candidates = cells.entry(cell_key(position)).or_default();
        let existing = candidates
            .iter()
            .copied()
            .find(|&id| (mesh.vertex(id).position - position).norm() < WELD_EPSILON);

        let id = match existing {
            Some(id) => id,
            None => {
                let id = VertexId::new(mesh.vertices.len());
                mesh.vertices
                    .push(Vertex::new(*position, normals[i], uvs[i]));
                candidates.push(id);
                id
            }
        };
        corner_to_vertex.push(id);
    }
    progress.report(num_corners, num_corners, "Welding vertices");

    // Emit faces against the welded indices, skipping triangles that
    // collapsed onto fewer than three distinct vertices. A trailing partial
    // triple is ignored.
    for t in corner_to_vertex.chunks_exact(3) {
        let [a, b, c] = [t[0], t[1], t[2]];
        if a == b || b == c || c == a {
            continue;
        }

        let face = Face::new(
            a,
            b,
            c,
            &mesh.vertex(a).position,
            &mesh.vertex(b).position,
            &mesh.vertex(c).position,
        );
        mesh.faces.push(face);
    }

    // Extract the unique undirected edges in face order.
    let mut edge_set: HashSet<(usize, usize)> = HashSet::new();
    let mut edges: Vec<Edge> = Vec::new();
    for face in &mesh.faces {
        for (u, v) in [(face.a, face.b), (face.b, face.c), (face.c, face.a)] {
            let (lo, hi) = (u.index().min(v.index()), u.index().max(v.index()));
            if edge_set.insert((lo, hi)) {
                edges.push(Edge::new(VertexId::new(lo), VertexId::new(hi)));
            }
        }
    }
    mesh.edges = edges;

    Ok(mesh)
}
