//! Validation helpers for clustering algorithms.

use crate::cluster::error::{ClusterError, ClusterResult};
use crate::cluster::traits::tgl_kmeans::TglKMeansOptions;

/// Validate n_clusters parameter.
pub fn validate_n_clusters(n_clusters: usize, n_points: usize, op: &'static str) -> ClusterResult<()> {
    if n_clusters == 0 {
        return Err(ClusterError::Configuration {
            arg: "n_clusters",
            reason: format!("{op} requires n_clusters > 0"),
        });
    }
    if n_clusters > n_points {
        return Err(ClusterError::Configuration {
            arg: "n_clusters",
            reason: format!("{op}: n_clusters={n_clusters} exceeds number of points {n_points}"),
        });
    }
    Ok(())
}

/// Validate max_iter parameter (must be positive).
pub fn validate_max_iter(max_iter: usize, op: &'static str) -> ClusterResult<()> {
    if max_iter == 0 {
        return Err(ClusterError::Configuration {
            arg: "max_iter",
            reason: format!("{op} requires max_iter > 0"),
        });
    }
    Ok(())
}

/// Validate min_delta parameter (fraction in [0, 1)).
pub fn validate_min_delta(min_delta: f64, op: &'static str) -> ClusterResult<()> {
    if !(0.0..1.0).contains(&min_delta) {
        return Err(ClusterError::Configuration {
            arg: "min_delta",
            reason: format!("{op} requires min_delta in [0, 1), got {min_delta}"),
        });
    }
    Ok(())
}

/// Validate a full option set against a data set of `n_points` rows.
pub fn validate_options(options: &TglKMeansOptions, n_points: usize, op: &'static str) -> ClusterResult<()> {
    validate_n_clusters(options.n_clusters, n_points, op)?;
    validate_max_iter(options.max_iter, op)?;
    validate_min_delta(options.min_delta, op)
}

/// Validate a center table [k, d].
pub fn validate_centers(centers: &[Vec<f64>], n_cols: usize, op: &'static str) -> ClusterResult<()> {
    if centers.is_empty() {
        return Err(ClusterError::Configuration {
            arg: "centers",
            reason: format!("{op} requires at least 1 center"),
        });
    }
    if let Some(i) = centers.iter().position(|c| c.len() != n_cols) {
        return Err(ClusterError::Configuration {
            arg: "centers",
            reason: format!(
                "{op}: center {i} has {} values, data has {n_cols} columns",
                centers[i].len()
            ),
        });
    }
    if centers.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ClusterError::Configuration {
            arg: "centers",
            reason: format!("{op}: centers contain non-finite values"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::data::MISSING;

    #[test]
    fn test_validate_n_clusters() {
        assert!(validate_n_clusters(3, 100, "test").is_ok());
        assert!(validate_n_clusters(100, 100, "test").is_ok());
        assert!(validate_n_clusters(0, 100, "test").is_err());
        assert!(validate_n_clusters(101, 100, "test").is_err());
    }

    #[test]
    fn test_validate_max_iter() {
        assert!(validate_max_iter(1, "test").is_ok());
        assert!(validate_max_iter(0, "test").is_err());
    }

    #[test]
    fn test_validate_min_delta() {
        assert!(validate_min_delta(0.0, "test").is_ok());
        assert!(validate_min_delta(0.5, "test").is_ok());
        assert!(validate_min_delta(1.0, "test").is_err());
        assert!(validate_min_delta(-0.1, "test").is_err());
        assert!(validate_min_delta(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_validate_centers() {
        assert!(validate_centers(&[vec![1.0, MISSING]], 2, "test").is_ok());
        assert!(validate_centers(&[], 2, "test").is_err());
        assert!(validate_centers(&[vec![1.0]], 2, "test").is_err());
        assert!(validate_centers(&[vec![1.0, f64::NAN]], 2, "test").is_err());
    }
}
