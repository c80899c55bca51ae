//! Plane equations and quadric error matrices.
//!
//! Each face carries the plane equation `ax + by + cz + d = 0` of its
//! original geometry. The **fundamental quadric** of such a plane is the
//! outer product `p · pᵀ` of `p = [a, b, c, d]`; for a homogeneous point
//! `x = [x, y, z, 1]`, the quadratic form `xᵀ K x` is the squared distance
//! of the point from the plane. A vertex quadric is the sum of the
//! fundamental quadrics of its incident faces, so its quadratic form
//! measures total squared deviation from the faces that originally met at
//! the vertex.
//!
//! Face planes are captured once at build time and never refreshed: vertex
//! quadrics must keep measuring error against the *original* surface, not
//! against the drifting approximation produced by successive collapses.

use nalgebra::{Matrix4, Point3, Vector4};

use crate::mesh::{Mesh, VertexId};

/// Determinant magnitude below which the constrained system is treated as
/// singular.
const DET_EPSILON: f64 = 1e-10;

/// Normal length below which a face is considered to have no meaningful
/// plane (zero-area face).
const AREA_EPSILON: f64 = 1e-10;

/// Compute the plane equation `[a, b, c, d]` of the triangle `(pa, pb, pc)`
/// with a unit normal, oriented by the winding of the corners.
///
/// Zero-area triangles (collinear corners) yield the all-zero plane, which
/// contributes nothing to any quadric.
pub fn face_plane(pa: &Point3<f64>, pb: &Point3<f64>, pc: &Point3<f64>) -> Vector4<f64> {
    let normal = (pb - pa).cross(&(pc - pa));
    let len = normal.norm();
    if len < AREA_EPSILON {
        return Vector4::zeros();
    }

    let n = normal / len;
    let d = -n.dot(&pa.coords);
    Vector4::new(n.x, n.y, n.z, d)
}

/// A quadric error matrix (4x4 symmetric matrix).
///
/// Represents the sum of squared distances to a set of planes. Stored as
/// the 10 unique elements of the symmetric matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric {
    /// Upper triangular elements: [a, b, c, d, e, f, g, h, i, j]
    /// Matrix form:
    /// | a b c d |
    /// | b e f g |
    /// | c f h i |
    /// | d g i j |
    data: [f64; 10],
}

impl Quadric {
    /// Create a zero quadric.
    pub fn zero() -> Self {
        Self { data: [0.0; 10] }
    }

    /// Create the fundamental quadric `p · pᵀ` of a plane equation.
    ///
    /// The plane normal `(a, b, c)` should be unit length for the quadratic
    /// form to measure squared Euclidean distance.
    pub fn from_plane(p: &Vector4<f64>) -> Self {
        let (a, b, c, d) = (p.x, p.y, p.z, p.w);
        Self {
            data: [
                a * a, // [0,0]
                a * b, // [0,1] = [1,0]
                a * c, // [0,2] = [2,0]
                a * d, // [0,3] = [3,0]
                b * b, // [1,1]
                b * c, // [1,2] = [2,1]
                b * d, // [1,3] = [3,1]
                c * c, // [2,2]
                c * d, // [2,3] = [3,2]
                d * d, // [3,3]
            ],
        }
    }

    /// Evaluate the quadratic form `vᵀ Q v` for `v = [x, y, z, 1]`.
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let (x, y, z) = (p.x, p.y, p.z);

        self.data[0] * x * x
            + 2.0 * self.data[1] * x * y
            + 2.0 * self.data[2] * x * z
            + 2.0 * self.data[3] * x
            + self.data[4] * y * y
            + 2.0 * self.data[5] * y * z
            + 2.0 * self.data[6] * y
            + self.data[7] * z * z
            + 2.0 * self.data[8] * z
            + self.data[9]
    }

    /// Expand to a dense 4x4 matrix.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        #[rustfmt::skip]
        let m = Matrix4::new(
            self.data[0], self.data[1], self.data[2], self.data[3],
            self.data[1], self.data[4], self.data[5], self.data[6],
            self.data[2], self.data[5], self.data[7], self.data[8],
            self.data[3], self.data[6], self.data[8], self.data[9],
        );
        m
    }

    /// Find the point minimizing the quadratic form subject to `w = 1`.
    ///
    /// Replaces the bottom row of the matrix with `(0, 0, 0, 1)` and solves
    /// `Q̄ · v = (0, 0, 0, 1)ᵀ`. Returns `None` when the constrained matrix
    /// is singular (planar or collinear neighborhoods have no unique
    /// minimizer).
    pub fn constrained_minimizer(&self) -> Option<Point3<f64>> {
        let mut m = self.to_matrix();
        m[(3, 0)] = 0.0;
        m[(3, 1)] = 0.0;
        m[(3, 2)] = 0.0;
        m[(3, 3)] = 1.0;

        if m.determinant().abs() <= DET_EPSILON {
            return None;
        }

        let inv = m.try_inverse()?;
        let v = inv * Vector4::new(0.0, 0.0, 0.0, 1.0);
        Some(Point3::new(v.x, v.y, v.z))
    }
}

impl std::ops::Add for Quadric {
    type Output = Quadric;

    fn add(self, other: Quadric) -> Quadric {
        let mut result = self;
        result += other;
        result
    }
}

impl std::ops::AddAssign for Quadric {
    fn add_assign(&mut self, other: Quadric) {
        for i in 0..10 {
            self.data[i] += other.data[i];
        }
    }
}

/// Initialize every vertex quadric from the live faces in a single O(F)
/// pass.
///
/// All quadrics are reset first, so calling this twice in a row is
/// idempotent. Use [`compute_vertex_quadric`] to refresh a single vertex
/// after a collapse.
pub fn compute_all_quadrics(mesh: &mut Mesh) {
    for vertex in &mut mesh.vertices {
        vertex.quadric = Quadric::zero();
    }

    for face in &mesh.faces {
        if face.deleted {
            continue;
        }

        let k = Quadric::from_plane(&face.plane);
        mesh.vertices[face.a.index()].quadric += k;
        mesh.vertices[face.b.index()].quadric += k;
        mesh.vertices[face.c.index()].quadric += k;
    }
}

/// Recompute one vertex quadric from scratch by scanning the live faces.
///
/// O(F) over the whole face array; acceptable because it runs once per
/// collapse on meshes this core targets.
pub fn compute_vertex_quadric(mesh: &mut Mesh, v: VertexId) {
    let mut quadric = Quadric::zero();

    for face in &mesh.faces {
        if face.deleted || !face.contains(v) {
            continue;
        }
        quadric += Quadric::from_plane(&face.plane);
    }

    mesh.vertices[v.index()].quadric = quadric;
}
