//! Rayon-based parallel executor.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use specsheet_traits::Executor;
use std::fmt;
use std::sync::Arc;

/// A parallel executor on rayon's work-stealing pool.
///
/// `new()` shares rayon's global pool. `with_threads(n)` owns a dedicated pool,
/// which caps how many image fetches are in flight at once; fetches block on
/// the network, so they should not occupy the global CPU pool.
#[derive(Clone)]
pub struct RayonExecutor {
    pool: Option<Arc<ThreadPool>>,
    num_threads: usize,
}

impl RayonExecutor {
    pub fn new() -> Self {
        Self {
            pool: None,
            num_threads: rayon::current_num_threads(),
        }
    }

    pub fn with_threads(num_threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let num_threads = num_threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("specsheet-fetch-{i}"))
            .build()?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
            num_threads,
        })
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RayonExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RayonExecutor")
            .field("dedicated_pool", &self.pool.is_some())
            .field("num_threads", &self.num_threads)
            .finish()
    }
}

impl Executor for RayonExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().map(f).collect()),
            None => items.into_par_iter().map(f).collect(),
        }
    }

    fn parallelism(&self) -> usize {
        self.num_threads
    }

    fn name(&self) -> &'static str {
        "RayonExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rayon_executor_preserves_order() {
        let executor = RayonExecutor::new();
        let results = executor.execute_all((0..100).collect(), |x: i32| x * 2);
        assert_eq!(results, (0..100).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_dedicated_pool_reports_its_size() {
        let executor = RayonExecutor::with_threads(3).unwrap();
        assert_eq!(executor.parallelism(), 3);
        let results = executor.execute_all(vec!["a", "bb"], |s| s.len());
        assert_eq!(results, vec![1, 2]);
    }

    #[test]
    fn test_zero_threads_is_clamped_to_one() {
        let executor = RayonExecutor::with_threads(0).unwrap();
        assert_eq!(executor.parallelism(), 1);
    }
}
