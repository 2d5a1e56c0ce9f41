//! Executor trait for fanning out independent work.
//!
//! The datasheet pipeline uses it to fetch the handful of images a document
//! needs. The fetches are independent and side-effect free, so any executor
//! produces the same document; a parallel one only lowers latency.

use std::fmt::Debug;

/// A trait for executing work items, potentially in parallel.
///
/// # Implementations
///
/// - `SyncExecutor`: Sequential execution, no threading (always available)
/// - `RayonExecutor`: Work-stealing thread pool (specsheet-executor, feature `rayon`)
pub trait Executor: Send + Sync + Debug {
    /// Execute a batch of work items. Results are returned in input order.
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static;

    /// Returns the level of parallelism this executor can provide.
    fn parallelism(&self) -> usize;

    /// Returns a human-readable name for this executor (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A synchronous executor that processes items sequentially.
#[derive(Debug, Clone, Default)]
pub struct SyncExecutor;

impl SyncExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SyncExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "SyncExecutor"
    }
}
