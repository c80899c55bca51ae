//! Edge-collapse mutation.
//!
//! Contracting an edge merges its second endpoint into the first: `v1`
//! moves to the cached optimal position, `v2` is tombstoned, and every
//! surviving edge and face that referenced `v2` is retargeted to `v1`.
//! Triangles that lose a dimension in the process (any repeated corner)
//! are tombstoned; that is the only way faces disappear from the mesh.
//!
//! Face planes are deliberately left untouched: the survivor's quadric is
//! rebuilt from planes captured at build time, so collapse costs keep
//! measuring deviation from the original surface rather than from the
//! current approximation.

use std::collections::HashSet;

use crate::mesh::{EdgeId, Mesh, VertexId};
use crate::quadric::compute_vertex_quadric;

use super::cost::refresh_edge_cost;

/// Endpoint spans shorter than this use the midpoint attribute blend.
const SPAN_EPSILON: f64 = 1e-10;

/// Contract the given edge, returning the surviving vertex.
///
/// The edge's `optimal_position` must be current. Retargeted edges that
/// become self-loops or duplicates of an edge already meeting the survivor
/// are tombstoned; the costs of all surviving edges incident to `v1` are
/// refreshed and their dirty flags cleared.
pub(crate) fn collapse_edge(mesh: &mut Mesh, id: EdgeId) -> VertexId {
    let edge = mesh.edge(id);
    let (v1, v2) = (edge.v1, edge.v2);
    let target = edge.optimal_position;

    // Attribute blend parameter, from the endpoints as they were before the
    // move: how far along v1 -> v2 the contraction target lies.
    let p1 = mesh.vertex(v1).position;
    let p2 = mesh.vertex(v2).position;
    let span = (p2 - p1).norm();
    let t = if span < SPAN_EPSILON {
        0.5
    } else {
        ((target - p1).norm() / span).clamp(0.0, 1.0)
    };

    mesh.vertex_mut(v1).position = target;
    mesh.vertex_mut(v2).deleted = true;
    mesh.deleted_vertices += 1;
    mesh.edge_mut(id).deleted = true;

    // Retarget edges, dropping self-loops and duplicates. `occupied` tracks
    // the endpoint pairs already meeting v1 so that two edges mapped onto
    // the same pair cannot both stay live.
    let mut affected: Vec<EdgeId> = Vec::new();
    let mut occupied: HashSet<(usize, usize)> = HashSet::new();
    for i in 0..mesh.edges.len() {
        let edge = &mut mesh.edges[i];
        if edge.deleted {
            continue;
        }

        if edge.v1 == v2 {
            edge.v1 = v1;
        }
        if edge.v2 == v2 {
            edge.v2 = v1;
        }

        if edge.v1 == edge.v2 {
            edge.deleted = true;
            continue;
        }

        if edge.touches(v1) {
            if occupied.insert(edge.key()) {
                affected.push(EdgeId::new(i));
            } else {
                edge.deleted = true;
            }
        }
    }

    // Retarget faces; any repeated corner means the triangle collapsed.
    for face in &mut mesh.faces {
        if face.deleted {
            continue;
        }

        if face.a == v2 {
            face.a = v1;
        }
        if face.b == v2 {
            face.b = v1;
        }
        if face.c == v2 {
            face.c = v1;
        }

        if face.is_degenerate() {
            face.deleted = true;
        }
    }

    // The survivor's quadric reflects the updated face set; its incident
    // edges get fresh costs against it.
    compute_vertex_quadric(mesh, v1);
    for &edge_id in &affected {
        if !mesh.edge(edge_id).deleted {
            refresh_edge_cost(mesh, edge_id);
            mesh.edge_mut(edge_id).dirty = false;
        }
    }

    let uv2 = mesh.vertex(v2).uv;
    let color2 = mesh.vertex(v2).color;
    let survivor = mesh.vertex_mut(v1);
    survivor.uv = survivor.uv.lerp(&uv2, t);
    survivor.color = survivor.color.lerp(&color2, t);

    v1
}
