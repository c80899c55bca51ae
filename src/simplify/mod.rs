//! Incremental mesh simplification by quadric error metrics.
//!
//! This module implements the edge-collapse simplification of Garland &
//! Heckbert: each vertex accumulates a quadric measuring squared deviation
//! from the planes that originally met there, each edge caches the
//! cost-minimizing position its endpoints could contract to, and a
//! priority queue executes the cheapest contractions first.
//!
//! Unlike a one-shot decimator, the [`Simplifier`] is built for hosts that
//! want to watch the mesh coarsen: every [`Simplifier::step`] performs a
//! bounded number of collapses and the mesh can be
//! [snapshotted](crate::mesh::Mesh::snapshot) between steps.
//!
//! # Example
//!
//! ```
//! use whittle::mesh::build_from_soup;
//! use whittle::simplify::{Simplifier, SimplifyOptions};
//! use nalgebra::{Point3, Vector2, Vector3};
//!
//! # let positions = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(1.0, 1.0, 0.0),
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 1.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0),
//! # ];
//! # let uvs = vec![Vector2::zeros(); 6];
//! # let normals = vec![Vector3::z(); 6];
//! let mesh = build_from_soup(&positions, &uvs, &normals)?;
//!
//! let options = SimplifyOptions::default().with_step_budget(4);
//! let mut simplifier = Simplifier::with_options(mesh, options);
//!
//! while simplifier.step_default() > 0 {
//!     let snapshot = simplifier.mesh().snapshot();
//!     // ... hand `snapshot` to the renderer ...
//! #     let _ = snapshot;
//! }
//! # Ok::<(), whittle::MeshError>(())
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using
//!   Quadric Error Metrics." SIGGRAPH '97.

mod collapse;
mod cost;
mod scheduler;

pub use cost::contraction_target;
pub use scheduler::{Simplifier, SimplifyStats};

/// Options for incremental simplification.
#[derive(Debug, Clone, Default)]
pub struct SimplifyOptions {
    /// Collapses per default step. `None` selects one percent of the
    /// original vertex count (at least one).
    pub step_budget: Option<usize>,

    /// Stop collapsing once the cheapest current edge costs more than this.
    /// `None` collapses without a ceiling.
    pub max_cost: Option<f64>,
}

impl SimplifyOptions {
    /// Set a fixed per-step collapse budget.
    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = Some(budget);
        self
    }

    /// Set a maximum acceptable collapse cost.
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }
}
