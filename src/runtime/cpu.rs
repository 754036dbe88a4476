//! CPU client backed by rayon.

use std::sync::Arc;

use log::debug;

use crate::cluster::error::{ClusterError, ClusterResult};

/// Handle on the worker threads that run the parallel phases.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Debug, Clone, Default)]
pub struct CpuClient {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl CpuClient {
    /// Client running on rayon's global pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Client with a private pool of `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> ClusterResult<Self> {
        if num_threads == 0 {
            return Err(ClusterError::Configuration {
                arg: "num_threads",
                reason: "requires at least 1 thread".to_string(),
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("tglkmeans-{i}"))
            .build()?;
        debug!("built worker pool with {num_threads} threads");
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Number of worker threads parallel work is spread over.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` with this client's pool as the ambient rayon pool.
    pub fn install<OP, T>(&self, op: OP) -> T
    where
        OP: FnOnce() -> T + Send,
        T: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_pool() {
        let client = CpuClient::with_threads(3).unwrap();
        assert_eq!(client.num_threads(), 3);
        assert_eq!(client.install(rayon::current_num_threads), 3);
        assert_eq!(client.clone().num_threads(), 3);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            CpuClient::with_threads(0),
            Err(ClusterError::Configuration { arg: "num_threads", .. })
        ));
    }

    #[test]
    fn test_global_pool() {
        let client = CpuClient::new();
        assert_eq!(client.install(|| 2 + 2), 4);
        assert_eq!(client.num_threads(), rayon::current_num_threads());
    }
}
