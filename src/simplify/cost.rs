//! Optimal contraction position and cost for an edge.
//!
//! For an edge between vertices carrying quadrics `Q₁` and `Q₂`, the
//! combined quadric `Q = Q₁ + Q₂` measures the total squared deviation from
//! every plane that originally met either endpoint. The contraction target
//! is the point minimizing that error subject to `w = 1`; the minimum value
//! is the collapse cost.

use nalgebra::Point3;

use crate::mesh::{EdgeId, Mesh};
use crate::quadric::Quadric;

/// Compute the cost-minimizing contraction of two vertices.
///
/// Solves the constrained linear system when the combined quadric permits a
/// unique minimizer. Otherwise the neighborhood is planar or collinear and
/// any point of a whole subspace is optimal; the endpoints and their
/// midpoint are evaluated instead and the cheapest wins, with the midpoint
/// preferred on ties. Never fails.
///
/// The returned cost is measured with the combined quadric itself, not the
/// constrained matrix: the substituted bottom row discards error terms by
/// construction.
pub fn contraction_target(
    q1: &Quadric,
    q2: &Quadric,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
) -> (Point3<f64>, f64) {
    let q = *q1 + *q2;

    if let Some(optimal) = q.constrained_minimizer() {
        // The form is a sum of squared distances; rounding in the expanded
        // evaluation can dip a hair below zero near the minimum.
        let cost = q.evaluate(&optimal).max(0.0);
        return (optimal, cost);
    }

    let midpoint = Point3::from((p1.coords + p2.coords) * 0.5);
    let mut best = (*p1, q.evaluate(p1));
    for candidate in [*p2, midpoint] {
        let cost = q.evaluate(&candidate);
        if cost <= best.1 {
            best = (candidate, cost);
        }
    }
    (best.0, best.1.max(0.0))
}

/// Refresh an edge's cached cost and optimal position from its endpoints'
/// current quadrics. Leaves the dirty flag untouched; the caller decides
/// when the cache is trustworthy.
pub(crate) fn refresh_edge_cost(mesh: &mut Mesh, id: EdgeId) {
    let edge = mesh.edge(id);
    let (v1, v2) = (edge.v1, edge.v2);
    let q1 = mesh.vertex(v1).quadric;
    let q2 = mesh.vertex(v2).quadric;
    let p1 = mesh.vertex(v1).position;
    let p2 = mesh.vertex(v2).position;

    let (optimal, cost) = contraction_target(&q1, &q2, &p1, &p2);

    let edge = mesh.edge_mut(id);
    edge.optimal_position = optimal;
    edge.cost = cost;
}
