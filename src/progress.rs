//! Progress reporting for long-running operations.
//!
//! Vertex welding and drive-to-target simplification can take a while on
//! large inputs. Entry points with a `_with_progress` suffix accept a
//! [`Progress`] callback and report periodically; the plain variants
//! discard all updates.

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: current step (0-based)
/// - `total`: total number of steps
/// - `message`: description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
