//! Index types for mesh elements.
//!
//! Vertices, edges, and faces cross-reference each other by position in the
//! mesh arenas. These wrappers keep the three index spaces from being mixed
//! up accidentally. Indices are never invalidated: deletion is expressed by
//! tombstone flags on the records themselves, so an id stays meaningful for
//! the life of the mesh.

use std::fmt::{self, Debug};

macro_rules! impl_id_type {
    ($(#[$doc:meta])* $name:ident, $display:literal) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// Panics in debug builds if the value does not fit in `u32`.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_id_type!(
    /// A type-safe vertex index.
    VertexId,
    "V"
);
impl_id_type!(
    /// A type-safe edge index.
    EdgeId,
    "E"
);
impl_id_type!(
    /// A type-safe face index.
    FaceId,
    "F"
);
