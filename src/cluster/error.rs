//! Error types for clustering operations.

use thiserror::Error;

/// Result type for clustering operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that abort a clustering run.
///
/// Per-row numeric degeneracies (zero variance, no shared dimensions, rows
/// that cannot be compared with any center) never surface here: the metric
/// resolves them to a sentinel distance and the run continues.
#[derive(Debug, Clone, Error)]
pub enum ClusterError {
    /// Invalid argument or malformed parameter, detected before any work starts.
    #[error("invalid argument '{arg}': {reason}")]
    Configuration { arg: &'static str, reason: String },

    /// Metric selector did not name a known metric.
    #[error("unknown metric '{name}': possible metrics are 'euclid', 'pearson' and 'spearman'")]
    UnknownMetric { name: String },

    /// No usable (not entirely missing) row could be found for a seed.
    #[error("seeding failed at seed {seed}: {reason}")]
    SeedingExhausted { seed: usize, reason: String },

    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for ClusterError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClusterError::Configuration {
            arg: "n_clusters",
            reason: "must be > 0".to_string(),
        };
        assert!(err.to_string().contains("n_clusters"));
        assert!(err.to_string().contains("must be > 0"));

        let err = ClusterError::UnknownMetric {
            name: "cosine".to_string(),
        };
        assert!(err.to_string().contains("cosine"));
        assert!(err.to_string().contains("spearman"));

        let err = ClusterError::SeedingExhausted {
            seed: 2,
            reason: "no usable row".to_string(),
        };
        assert!(err.to_string().contains("seed 2"));
    }
}
