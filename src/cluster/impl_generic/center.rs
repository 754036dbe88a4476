//! Cluster center with per-dimension vote accumulation.

use crate::cluster::data::{MISSING, is_missing};
use crate::cluster::impl_generic::metric::Metric;
use crate::cluster::traits::tgl_kmeans::MetricKind;

/// Representative vector of one cluster.
///
/// Lifecycle: `reset` clears the accumulators, `vote` adds weighted rows,
/// `finalize` replaces the values with the per-dimension means and refreshes
/// the metric caches. Dimensions are normalized independently: a dimension's
/// value is the mean over exactly the rows that voted a non-missing value
/// into it.
#[derive(Debug, Clone)]
pub struct Center {
    values: Vec<f64>,
    sums: Vec<f64>,
    weights: Vec<f64>,
    metric: Metric,
}

impl Center {
    /// Center of dimension `dim` whose values are all missing.
    pub fn new(dim: usize, kind: MetricKind) -> Self {
        let values = vec![MISSING; dim];
        let mut metric = Metric::new(kind);
        metric.on_center_finalized(&values);
        Self {
            values,
            sums: vec![0.0; dim],
            weights: vec![0.0; dim],
            metric,
        }
    }

    /// Center initialized to the given values, caches computed.
    pub fn from_values(values: Vec<f64>, kind: MetricKind) -> Self {
        let dim = values.len();
        let mut metric = Metric::new(kind);
        metric.on_center_finalized(&values);
        Self {
            values,
            sums: vec![0.0; dim],
            weights: vec![0.0; dim],
            metric,
        }
    }

    /// Current value vector.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Metric and its cached statistics.
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Accumulated weight of dimension `dim` since the last reset.
    pub fn total_weight(&self, dim: usize) -> f64 {
        self.weights[dim]
    }

    /// Distance from `row` to this center.
    #[inline]
    pub fn distance(&self, row: &[f64]) -> f64 {
        self.metric.distance(row, &self.values)
    }

    /// Zero the accumulators. Values are left untouched.
    pub fn reset(&mut self) {
        self.sums.fill(0.0);
        self.weights.fill(0.0);
    }

    /// Add `weight * row` to the accumulators, skipping missing cells.
    pub fn vote(&mut self, row: &[f64], weight: f64) {
        for ((s, w), &x) in self.sums.iter_mut().zip(self.weights.iter_mut()).zip(row) {
            if !is_missing(x) {
                *s += weight * x;
                *w += weight;
            }
        }
    }

    /// Replace values with the accumulated means and refresh metric caches.
    ///
    /// Dimensions without any accumulated weight become [`MISSING`].
    pub fn finalize(&mut self) {
        for ((v, &s), &w) in self.values.iter_mut().zip(&self.sums).zip(&self.weights) {
            *v = if w != 0.0 { s / w } else { MISSING };
        }
        self.metric.on_center_finalized(&self.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_starts_missing() {
        let c = Center::new(3, MetricKind::Euclid);
        assert!(c.values().iter().all(|&v| is_missing(v)));
        assert_eq!(c.distance(&[1.0, 2.0, 3.0]), MISSING);
    }

    #[test]
    fn test_vote_per_dimension_mean() {
        let mut c = Center::new(3, MetricKind::Euclid);
        c.vote(&[1.0, MISSING, 3.0], 1.0);
        c.vote(&[3.0, 4.0, MISSING], 1.0);
        c.finalize();
        assert_eq!(c.values(), &[2.0, 4.0, 3.0]);
        assert_eq!(c.total_weight(0), 2.0);
        assert_eq!(c.total_weight(1), 1.0);
    }

    #[test]
    fn test_weighted_vote() {
        let mut c = Center::new(1, MetricKind::Euclid);
        c.vote(&[1.0], 3.0);
        c.vote(&[5.0], 1.0);
        c.finalize();
        assert!((c.values()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_without_votes_is_missing() {
        let mut c = Center::new(2, MetricKind::Pearson);
        c.vote(&[1.0, MISSING], 1.0);
        c.finalize();
        assert_eq!(c.values()[0], 1.0);
        assert!(is_missing(c.values()[1]));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut c = Center::new(3, MetricKind::Spearman);
        c.vote(&[1.0, 2.0, 9.0], 1.0);
        c.vote(&[2.0, MISSING, 1.0], 1.0);
        c.finalize();
        let first = c.values().to_vec();
        let probe = [3.0, 1.0, 2.0];
        let d1 = c.distance(&probe);
        c.finalize();
        assert_eq!(c.values(), first.as_slice());
        assert_eq!(c.distance(&probe), d1);
    }

    #[test]
    fn test_reset_keeps_values() {
        let mut c = Center::from_values(vec![1.0, 2.0], MetricKind::Euclid);
        c.vote(&[5.0, 5.0], 1.0);
        c.reset();
        assert_eq!(c.values(), &[1.0, 2.0]);
        assert_eq!(c.total_weight(0), 0.0);
        c.finalize();
        assert!(c.values().iter().all(|&v| is_missing(v)));
    }
}
