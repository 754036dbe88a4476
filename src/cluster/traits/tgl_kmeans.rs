//! Missing-value tolerant K-Means trait.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cluster::data::DataSet;
use crate::cluster::error::{ClusterError, ClusterResult};

/// Dissimilarity used to compare rows with centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Euclidean distance averaged over the jointly valid dimensions (default).
    #[default]
    Euclid,
    /// Pearson correlation.
    Pearson,
    /// Negated Spearman rank correlation.
    Spearman,
}

impl MetricKind {
    /// Selector string accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Euclid => "euclid",
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclid" => Ok(Self::Euclid),
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            other => Err(ClusterError::UnknownMetric {
                name: other.to_string(),
            }),
        }
    }
}

/// Options for missing-value tolerant K-Means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TglKMeansOptions {
    /// Number of clusters (k).
    pub n_clusters: usize,
    /// Dissimilarity metric.
    pub metric: MetricKind,
    /// Maximum number of iterations after the initial reassignment.
    pub max_iter: usize,
    /// Stop once the fraction of rows changing cluster is at most this value.
    pub min_delta: f64,
    /// Seed for the seeding RNG. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TglKMeansOptions {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            metric: MetricKind::Euclid,
            max_iter: 40,
            min_delta: 1e-4,
            seed: None,
        }
    }
}

impl TglKMeansOptions {
    pub fn new(n_clusters: usize, metric: MetricKind) -> Self {
        Self {
            n_clusters,
            metric,
            ..Default::default()
        }
    }

    /// Parse the metric from its selector string.
    pub fn with_metric_name(mut self, name: &str) -> ClusterResult<Self> {
        self.metric = name.parse()?;
        Ok(self)
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_min_delta(mut self, min_delta: f64) -> Self {
        self.min_delta = min_delta;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Phase of a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Choosing the k initial centers.
    Seeding,
    /// Seeds chosen; the first full reassignment has not run yet.
    InitialReassign,
    /// Refining centers until convergence.
    Iterating,
    /// Change fraction dropped to `min_delta` or below.
    Converged,
    /// Stopped after `max_iter` iterations.
    MaxIterReached,
    /// Stopped by the caller between iterations.
    Aborted,
}

impl EngineState {
    /// True once the run can no longer advance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::MaxIterReached | Self::Aborted)
    }
}

/// One line of the assignment table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord<S> {
    /// Caller-supplied row identifier.
    pub id: S,
    /// Cluster index in `[0, k)`.
    pub cluster: usize,
    /// Distance to the assigned center, [`crate::cluster::MISSING`] for
    /// rows placed by the fallback.
    pub distance: f64,
}

/// Result of missing-value tolerant K-Means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TglKMeansResult {
    /// Center table [k, d]; cells that never received a vote are MISSING.
    pub centers: Vec<Vec<f64>>,
    /// Cluster index of each row [n].
    pub labels: Vec<usize>,
    /// Distance of each row to its center at the last reassignment [n].
    pub distances: Vec<f64>,
    /// Number of iterations run after the initial reassignment.
    pub n_iter: usize,
    /// Rows that changed cluster in the last reassignment.
    pub changes: usize,
    /// Rows with no finite distance to any center, placed in cluster 0.
    pub n_undistanceable: usize,
    /// Terminal state of the run.
    pub state: EngineState,
}

impl TglKMeansResult {
    /// Pair the labels with caller row identifiers.
    ///
    /// Returns `None` if `ids` does not have one entry per row.
    pub fn assignment_table<S: Clone>(&self, ids: &[S]) -> Option<Vec<AssignmentRecord<S>>> {
        if ids.len() != self.labels.len() {
            return None;
        }
        Some(
            ids.iter()
                .zip(&self.labels)
                .zip(&self.distances)
                .map(|((id, &cluster), &distance)| AssignmentRecord {
                    id: id.clone(),
                    cluster,
                    distance,
                })
                .collect(),
        )
    }

    /// Number of clusters.
    pub fn n_clusters(&self) -> usize {
        self.centers.len()
    }

    /// Row count of every cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centers.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Missing-value tolerant K-Means clustering algorithms.
pub trait TglKMeansAlgorithms {
    /// Cluster the rows of `data` [n, d].
    fn tgl_kmeans(
        &self,
        data: &DataSet<'_>,
        options: &TglKMeansOptions,
    ) -> ClusterResult<TglKMeansResult>;

    /// Assign each row of `data` to the nearest of the fixed `centers` [k, d].
    fn tgl_kmeans_predict(
        &self,
        centers: &[Vec<f64>],
        metric: MetricKind,
        data: &DataSet<'_>,
    ) -> ClusterResult<Vec<usize>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_kind_parse() {
        assert_eq!("euclid".parse::<MetricKind>().unwrap(), MetricKind::Euclid);
        assert_eq!("pearson".parse::<MetricKind>().unwrap(), MetricKind::Pearson);
        assert_eq!(
            "spearman".parse::<MetricKind>().unwrap(),
            MetricKind::Spearman
        );
        assert!(matches!(
            "Euclid".parse::<MetricKind>(),
            Err(ClusterError::UnknownMetric { .. })
        ));
        assert_eq!(MetricKind::Spearman.to_string(), "spearman");
    }

    #[test]
    fn test_options_defaults() {
        let opts = TglKMeansOptions::default();
        assert_eq!(opts.max_iter, 40);
        assert!((opts.min_delta - 1e-4).abs() < 1e-15);
        assert_eq!(opts.metric, MetricKind::Euclid);
        assert!(opts.seed.is_none());

        let opts = TglKMeansOptions::new(3, MetricKind::Euclid)
            .with_metric_name("pearson")
            .unwrap()
            .with_seed(7);
        assert_eq!(opts.metric, MetricKind::Pearson);
        assert_eq!(opts.seed, Some(7));
        assert!(TglKMeansOptions::default().with_metric_name("l1").is_err());
    }

    #[test]
    fn test_assignment_table() {
        let result = TglKMeansResult {
            centers: vec![vec![0.5], vec![10.5]],
            labels: vec![0, 0, 1],
            distances: vec![0.5, 0.5, 0.0],
            n_iter: 1,
            changes: 0,
            n_undistanceable: 0,
            state: EngineState::Converged,
        };
        let table = result.assignment_table(&["a", "b", "c"]).unwrap();
        assert_eq!(table[2].id, "c");
        assert_eq!(table[2].cluster, 1);
        assert_eq!(result.cluster_sizes(), vec![2, 1]);
        assert!(result.assignment_table(&["a"]).is_none());
    }
}
