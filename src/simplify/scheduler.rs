//! Priority-driven simplification scheduling.
//!
//! The scheduler owns the mesh and a min-heap of edge cost snapshots. The
//! heap is intentionally allowed to go stale: collapsing an edge changes
//! the costs of every edge around the surviving vertex, and pruning those
//! entries from a binary heap would cost O(n) each. Instead, mutated edges
//! are flagged dirty on the authoritative record and re-pushed; snapshots
//! whose live counterpart is gone or flagged are recognized when popped and
//! discarded or refreshed cheaply.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::Point3;

use crate::mesh::{EdgeId, Mesh, VertexId};
use crate::progress::Progress;
use crate::quadric::compute_all_quadrics;

use super::collapse::collapse_edge;
use super::cost::refresh_edge_cost;
use super::SimplifyOptions;

/// Per-call collapse budget denominator for the default policy: one percent
/// of the original vertex count per step.
const DEFAULT_BUDGET_DIVISOR: usize = 100;

/// A cost snapshot of an edge at the time it was (re)inserted into the
/// heap. Carries copies of the endpoints and target so the heap never
/// borrows the mesh.
#[derive(Debug, Clone)]
struct Candidate {
    cost: f64,
    v1: VertexId,
    v2: VertexId,
    #[allow(dead_code)]
    position: Point3<f64>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the cheapest first.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

/// Counters describing the current simplification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyStats {
    /// Total vertex slots, tombstoned included.
    pub total_vertices: usize,
    /// Tombstoned vertices.
    pub deleted_vertices: usize,
    /// Live faces.
    pub live_faces: usize,
    /// Live edges.
    pub live_edges: usize,
    /// Entries currently in the heap, stale ones included.
    pub heap_size: usize,
}

/// Incremental QEM simplifier.
///
/// Owns a mesh and contracts its edges in order of geometric error,
/// a bounded number per [`step`](Self::step), so a host can interleave
/// simplification with rendering. Vertex quadrics are initialized on
/// construction; edge costs are computed lazily on the first step.
///
/// # Example
/// ```
/// use whittle::mesh::build_from_soup;
/// use whittle::simplify::Simplifier;
/// use nalgebra::{Point3, Vector2, Vector3};
///
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
/// let mesh = build_from_soup(&positions, &uvs, &normals).unwrap();
///
/// let mut simplifier = Simplifier::new(mesh);
/// let collapsed = simplifier.step(1);
/// assert_eq!(collapsed, 1);
/// ```
#[derive(Debug)]
pub struct Simplifier {
    mesh: Mesh,
    heap: BinaryHeap<Candidate>,
    seeded: bool,
    original_vertices: usize,
    options: SimplifyOptions,
}

impl Simplifier {
    /// Take ownership of a mesh and initialize its vertex quadrics.
    pub fn new(mesh: Mesh) -> Self {
        Self::with_options(mesh, SimplifyOptions::default())
    }

    /// [`new`](Self::new) with explicit options.
    pub fn with_options(mut mesh: Mesh, options: SimplifyOptions) -> Self {
        compute_all_quadrics(&mut mesh);
        let original_vertices = mesh.num_vertices();
        Self {
            mesh,
            heap: BinaryHeap::new(),
            seeded: false,
            original_vertices,
            options,
        }
    }

    /// The current mesh. Only consistent between steps.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Consume the simplifier and return the mesh.
    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    /// The per-step collapse budget used by [`step_default`](Self::step_default):
    /// the configured budget if set, otherwise one percent of the original
    /// vertex count, and at least one.
    pub fn default_budget(&self) -> usize {
        self.options
            .step_budget
            .unwrap_or_else(|| (self.original_vertices / DEFAULT_BUDGET_DIVISOR).max(1))
    }

    /// Perform up to `budget` edge collapses and return how many happened.
    ///
    /// Pops cost snapshots in ascending order. A snapshot whose edge has
    /// since been tombstoned is discarded; one whose edge is flagged dirty
    /// gets a recomputed cost and goes back into the heap for a later turn.
    /// Only a snapshot backed by a live, clean edge triggers a collapse,
    /// after which every edge around the surviving vertex is flagged dirty
    /// and re-pushed with its refreshed cost.
    ///
    /// Returning less than `budget` (in particular `0`) means the heap
    /// drained: the mesh cannot be simplified further.
    pub fn step(&mut self, budget: usize) -> usize {
        self.seed_heap();

        let mut performed = 0;
        while performed < budget {
            let candidate = match self.heap.pop() {
                Some(c) => c,
                None => break,
            };

            // Locate the authoritative record; the snapshot's endpoints may
            // be listed in either order.
            let id = match self.find_live_edge(candidate.v1, candidate.v2) {
                Some(id) => id,
                None => continue,
            };

            if self.mesh.edge(id).dirty {
                refresh_edge_cost(&mut self.mesh, id);
                self.mesh.edge_mut(id).dirty = false;
                self.push_candidate(id);
                continue;
            }

            if let Some(max_cost) = self.options.max_cost {
                if self.mesh.edge(id).cost > max_cost {
                    break;
                }
            }

            let survivor = collapse_edge(&mut self.mesh, id);
            self.flag_incident(survivor);
            performed += 1;
        }

        performed
    }

    /// [`step`](Self::step) with the default budget policy.
    pub fn step_default(&mut self) -> usize {
        self.step(self.default_budget())
    }

    /// Drive [`step_default`](Self::step_default) until at most `target`
    /// faces remain live or no further collapse is possible. Returns the
    /// total number of collapses performed.
    pub fn simplify_to_face_count(&mut self, target: usize) -> usize {
        self.simplify_to_face_count_with_progress(target, &Progress::none())
    }

    /// [`simplify_to_face_count`](Self::simplify_to_face_count) with
    /// progress reporting after every step.
    pub fn simplify_to_face_count_with_progress(
        &mut self,
        target: usize,
        progress: &Progress,
    ) -> usize {
        let start = self.mesh.live_face_count();
        let goal = start.saturating_sub(target);

        let mut collapses = 0;
        while self.mesh.live_face_count() > target {
            let performed = self.step_default();
            if performed == 0 {
                break;
            }
            collapses += performed;
            progress.report(
                start - self.mesh.live_face_count(),
                goal,
                "Collapsing edges",
            );
        }
        collapses
    }

    /// Current counters, including the heap occupancy.
    pub fn stats(&self) -> SimplifyStats {
        SimplifyStats {
            total_vertices: self.mesh.num_vertices(),
            deleted_vertices: self.mesh.deleted_vertex_count(),
            live_faces: self.mesh.live_face_count(),
            live_edges: self.mesh.live_edge_count(),
            heap_size: self.heap.len(),
        }
    }

    /// First call only: cost every live edge and push its snapshot.
    fn seed_heap(&mut self) {
        if self.seeded {
            return;
        }
        self.seeded = true;

        for i in 0..self.mesh.edges.len() {
            if self.mesh.edges[i].deleted {
                continue;
            }
            let id = EdgeId::new(i);
            refresh_edge_cost(&mut self.mesh, id);
            self.mesh.edge_mut(id).dirty = false;
            self.push_candidate(id);
        }
    }

    /// Scan for the live edge joining `a` and `b`, in either orientation.
    fn find_live_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.mesh
            .edges
            .iter()
            .position(|e| !e.deleted && ((e.v1 == a && e.v2 == b) || (e.v1 == b && e.v2 == a)))
            .map(EdgeId::new)
    }

    fn push_candidate(&mut self, id: EdgeId) {
        let edge = self.mesh.edge(id);
        self.heap.push(Candidate {
            cost: edge.cost,
            v1: edge.v1,
            v2: edge.v2,
            position: edge.optimal_position,
        });
    }

    /// After a collapse: every surviving edge around the survivor carries a
    /// cost computed against the new neighborhood, but its *neighbors'*
    /// quadrics may still change in future collapses. Flag them so later
    /// pops re-verify, and push their refreshed snapshots.
    fn flag_incident(&mut self, survivor: VertexId) {
        for i in 0..self.mesh.edges.len() {
            if self.mesh.edges[i].deleted || !self.mesh.edges[i].touches(survivor) {
                continue;
            }
            self.mesh.edges[i].dirty = true;
            self.push_candidate(EdgeId::new(i));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_soup;
    use nalgebra::{Vector2, Vector3};

    fn soup_from_indexed(
        corners: &[Point3<f64>],
        faces: &[[usize; 3]],
    ) -> (Vec<Point3<f64>>, Vec<Vector2<f64>>, Vec<Vector3<f64>>) {
        let positions: Vec<_> = faces
            .iter()
            .flat_map(|f| f.iter().map(|&i| corners[i]))
            .collect();
        let uvs = vec![Vector2::zeros(); positions.len()];
        let normals = vec![Vector3::z(); positions.len()];
        (positions, uvs, normals)
    }

    fn square_simplifier() -> Simplifier {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let (positions, uvs, normals) =
            soup_from_indexed(&corners, &[[0, 1, 2], [0, 2, 3]]);
        Simplifier::new(build_from_soup(&positions, &uvs, &normals).unwrap())
    }

    fn grid_soup(
        nx: usize,
        ny: usize,
    ) -> (Vec<Point3<f64>>, Vec<Vector2<f64>>, Vec<Vector3<f64>>) {
        let mut corners = Vec::new();
        let mut faces = Vec::new();
        for j in 0..=ny {
            for i in 0..=nx {
                corners.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for j in 0..ny {
            for i in 0..nx {
                let v00 = j * (nx + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (nx + 1);
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        soup_from_indexed(&corners, &faces)
    }

    fn octahedron_simplifier() -> Simplifier {
        let corners = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = [
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        let (positions, uvs, normals) = soup_from_indexed(&corners, &faces);
        Simplifier::new(build_from_soup(&positions, &uvs, &normals).unwrap())
    }

    #[test]
    fn test_planar_collapse_is_free() {
        let mut simplifier = square_simplifier();
        assert_eq!(simplifier.step(1), 1);

        let stats = simplifier.stats();
        assert_eq!(stats.deleted_vertices, 1);
        // A boundary edge takes one triangle with it, the diagonal both.
        assert!(stats.live_faces <= 1);
        assert!(simplifier.mesh().validate());

        // The surface never leaves the z = 0 plane.
        let snapshot = simplifier.mesh().snapshot();
        for triple in &snapshot.indices {
            for &i in triple {
                assert!(snapshot.positions[i as usize][2].abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_zero_budget_is_noop() {
        let mut simplifier = square_simplifier();
        let before = simplifier.stats();

        assert_eq!(simplifier.step(0), 0);

        let after = simplifier.stats();
        assert_eq!(after.deleted_vertices, before.deleted_vertices);
        assert_eq!(after.live_faces, before.live_faces);
        assert_eq!(after.live_edges, before.live_edges);
    }

    #[test]
    fn test_tetrahedron_single_step() {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let (positions, uvs, normals) = soup_from_indexed(&corners, &faces);
        let mut simplifier =
            Simplifier::new(build_from_soup(&positions, &uvs, &normals).unwrap());

        assert_eq!(simplifier.step(1), 1);

        let stats = simplifier.stats();
        assert_eq!(stats.deleted_vertices, 1);
        assert!(stats.live_faces <= 2);
        assert!(simplifier.mesh().validate());
        for (_, edge) in simplifier.mesh().live_edges() {
            assert!(edge.cost >= 0.0);
        }
    }

    #[test]
    fn test_face_count_drops_at_most_two_per_collapse() {
        let mut simplifier = octahedron_simplifier();

        for _ in 0..2 {
            let before = simplifier.mesh().live_face_count();
            let performed = simplifier.step(1);
            let after = simplifier.mesh().live_face_count();

            assert_eq!(performed, 1);
            assert!(after <= before);
            assert!(before - after <= 2);
            assert!(simplifier.mesh().validate());
        }
    }

    #[test]
    fn test_default_budget_policy() {
        // A 19x14 grid welds to exactly 300 unique vertices.
        let (positions, uvs, normals) = grid_soup(19, 14);
        let mut simplifier =
            Simplifier::new(build_from_soup(&positions, &uvs, &normals).unwrap());
        assert_eq!(simplifier.mesh().live_vertex_count(), 300);
        assert_eq!(simplifier.default_budget(), 3);

        let performed = simplifier.step_default();
        assert!(performed >= 1 && performed <= 3);

        // Repeated default steps never exceed the per-call budget and
        // eventually drain the heap.
        let mut total = performed;
        for _ in 0..200 {
            let n = simplifier.step_default();
            assert!(n <= 3);
            total += n;
            if n == 0 {
                break;
            }
        }
        assert!(total <= 300);
        assert!(simplifier.mesh().validate());
    }

    #[test]
    fn test_configured_budget_overrides_policy() {
        let (positions, uvs, normals) = grid_soup(19, 14);
        let mesh = build_from_soup(&positions, &uvs, &normals).unwrap();
        let simplifier =
            Simplifier::with_options(mesh, SimplifyOptions::default().with_step_budget(7));
        assert_eq!(simplifier.default_budget(), 7);
    }

    #[test]
    fn test_max_cost_cutoff() {
        // Every octahedron edge has a strictly positive collapse cost, so a
        // tiny ceiling stops the scheduler before any collapse.
        let mesh = octahedron_simplifier().into_mesh();
        let mut simplifier =
            Simplifier::with_options(mesh, SimplifyOptions::default().with_max_cost(1e-9));

        assert_eq!(simplifier.step(10), 0);
        assert_eq!(simplifier.stats().deleted_vertices, 0);
        assert_eq!(simplifier.mesh().live_face_count(), 8);
    }

    #[test]
    fn test_invariants_hold_across_full_run() {
        let (positions, uvs, normals) = grid_soup(6, 6);
        let mut simplifier =
            Simplifier::new(build_from_soup(&positions, &uvs, &normals).unwrap());

        loop {
            let performed = simplifier.step(5);
            assert!(simplifier.mesh().validate());
            if performed == 0 {
                break;
            }
        }

        let stats = simplifier.stats();
        assert_eq!(
            stats.deleted_vertices,
            stats.total_vertices - simplifier.mesh().live_vertex_count()
        );
    }

    #[test]
    fn test_simplify_to_face_count() {
        let (positions, uvs, normals) = grid_soup(8, 8);
        let mut simplifier =
            Simplifier::new(build_from_soup(&positions, &uvs, &normals).unwrap());
        let before = simplifier.mesh().live_face_count();
        assert_eq!(before, 128);

        let collapses = simplifier.simplify_to_face_count(10);
        assert!(collapses > 0);
        assert!(simplifier.mesh().live_face_count() <= 10);
        assert!(simplifier.mesh().validate());
    }

    #[test]
    fn test_stats_track_heap() {
        let mut simplifier = square_simplifier();
        assert_eq!(simplifier.stats().heap_size, 0);

        simplifier.step(0);
        // Lazy seeding happens on the first step call, budget or not.
        assert_eq!(simplifier.stats().heap_size, 5);
    }
}
