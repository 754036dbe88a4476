//! Dissimilarity metrics between data rows and cluster centers.
//!
//! A [`Metric`] lives inside each center and carries whatever statistics of
//! the center's value vector it needs. `distance` is read-only and may be
//! called concurrently; `on_center_finalized` refreshes the cached statistics
//! and is only called while no distance evaluation is running against the
//! same center.
//!
//! All metrics follow "smaller is closer". Cells equal to [`MISSING`] in
//! either vector are skipped dimension by dimension.

use std::borrow::Cow;

use crate::cluster::data::{MISSING, is_missing};
use crate::cluster::impl_generic::ranking::{mid_ranks_from_order, sorted_order};
use crate::cluster::traits::tgl_kmeans::MetricKind;

/// Cached Spearman statistics of a center.
#[derive(Debug, Clone, Default)]
pub struct RankCache {
    /// Non-missing center dimensions sorted by value.
    order: Vec<usize>,
    /// Mid-ranks over all non-missing center dimensions.
    ranks: Vec<f64>,
}

/// Metric with its per-center cached statistics.
#[derive(Debug, Clone)]
pub enum Metric {
    /// Average-per-valid-dimension Euclidean score: `sqrt(sum_sq) / n`.
    Euclid,
    /// Pearson correlation against the center's cached mean and variance.
    Pearson { mean: f64, variance: f64 },
    /// Negated Spearman rank correlation.
    Spearman(RankCache),
}

impl Metric {
    /// Metric with empty caches. Call [`Metric::on_center_finalized`] before
    /// the first distance evaluation.
    pub fn new(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Euclid => Self::Euclid,
            MetricKind::Pearson => Self::Pearson {
                mean: 0.0,
                variance: 0.0,
            },
            MetricKind::Spearman => Self::Spearman(RankCache::default()),
        }
    }

    /// The selector this metric was built from.
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Euclid => MetricKind::Euclid,
            Self::Pearson { .. } => MetricKind::Pearson,
            Self::Spearman(_) => MetricKind::Spearman,
        }
    }

    /// Dissimilarity between `row` and the center values `center`.
    pub fn distance(&self, row: &[f64], center: &[f64]) -> f64 {
        debug_assert_eq!(row.len(), center.len());
        match self {
            Self::Euclid => euclid_distance(row, center),
            Self::Pearson { mean, variance } => pearson_distance(row, center, *mean, *variance),
            Self::Spearman(cache) => spearman_distance(row, center, cache),
        }
    }

    /// Recompute cached statistics after the center's values changed.
    pub fn on_center_finalized(&mut self, center: &[f64]) {
        match self {
            Self::Euclid => {}
            Self::Pearson { mean, variance } => {
                let (m, v) = center_moments(center);
                *mean = m;
                *variance = v;
            }
            Self::Spearman(cache) => {
                cache.order = sorted_order(center);
                cache.ranks.resize(center.len(), 0.0);
                let order = &cache.order;
                mid_ranks_from_order(center, order, |_| true, &mut cache.ranks);
            }
        }
    }
}

fn euclid_distance(row: &[f64], center: &[f64]) -> f64 {
    // Scaled sum of squares: sum_sq = scale^2 * ssq, so large cells do not
    // overflow before the square root.
    let mut scale = 0.0f64;
    let mut ssq = 1.0f64;
    let mut n = 0usize;
    for (&x, &c) in row.iter().zip(center) {
        if !is_missing(x) && !is_missing(c) {
            n += 1;
            let d = (c - x).abs();
            if d == 0.0 {
                continue;
            }
            if scale < d {
                let r = scale / d;
                ssq = 1.0 + ssq * r * r;
                scale = d;
            } else {
                let r = d / scale;
                ssq += r * r;
            }
        }
    }
    if n == 0 {
        return MISSING;
    }
    // sqrt(sum) / n, not sqrt(sum / n)
    let dist = scale * (ssq.sqrt() / n as f64);
    if is_missing(dist) { f64::INFINITY } else { dist }
}

/// True if every cell yielded by `cells` has the same value.
fn is_constant(mut cells: impl Iterator<Item = f64>) -> bool {
    match cells.next() {
        Some(first) => cells.all(|v| v == first),
        None => true,
    }
}

/// Mean and population variance over the non-missing cells of `center`.
///
/// Constant centers get a variance of exactly 0.
fn center_moments(center: &[f64]) -> (f64, f64) {
    let valid = || center.iter().copied().filter(|&c| !is_missing(c));
    let n = valid().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = valid().sum::<f64>() / n as f64;
    if is_constant(valid()) {
        return (mean, 0.0);
    }
    let var = valid().map(|c| (c - mean) * (c - mean)).sum::<f64>() / n as f64;
    (mean, var)
}

fn pearson_distance(row: &[f64], center: &[f64], center_mean: f64, center_var: f64) -> f64 {
    let joint = || {
        row.iter()
            .zip(center)
            .filter(|&(&x, &c)| !is_missing(x) && !is_missing(c))
            .map(|(&x, &c)| (x, c))
    };
    let mut cross = 0.0;
    let mut sum = 0.0;
    let mut n = 0usize;
    for (x, c) in joint() {
        cross += c * x;
        sum += x;
        n += 1;
    }
    if n == 0 || center_var <= 0.0 || is_constant(joint().map(|(x, _)| x)) {
        return 0.0;
    }
    let nf = n as f64;
    let row_mean = sum / nf;
    let row_var = joint().map(|(x, _)| (x - row_mean) * (x - row_mean)).sum::<f64>() / nf;
    if row_var <= 0.0 {
        return 0.0;
    }
    let cov = cross / nf - row_mean * center_mean;
    cov / (center_var * row_var).sqrt()
}

fn spearman_distance(row: &[f64], center: &[f64], cache: &RankCache) -> f64 {
    let dim = row.len();

    // Cached center ranks are valid only if the row covers every center cell.
    let covers_center = cache.order.iter().all(|&i| !is_missing(row[i]));
    let center_ranks: Cow<'_, [f64]> = if covers_center {
        Cow::Borrowed(&cache.ranks)
    } else {
        let mut ranks = vec![0.0; dim];
        mid_ranks_from_order(center, &cache.order, |i| !is_missing(row[i]), &mut ranks);
        Cow::Owned(ranks)
    };

    // Row ranks are always computed fresh, over the jointly valid cells.
    let mut row_order: Vec<usize> = (0..dim)
        .filter(|&i| !is_missing(row[i]) && !is_missing(center[i]))
        .collect();
    row_order.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
    let mut row_ranks = vec![0.0; dim];
    mid_ranks_from_order(row, &row_order, |_| true, &mut row_ranks);

    let mut n = 0usize;
    let (mut e1, mut e2) = (0.0, 0.0);
    let (mut v1, mut v2) = (0.0, 0.0);
    let mut cov = 0.0;
    for &i in &row_order {
        let (r1, r2) = (row_ranks[i], center_ranks[i]);
        cov += r1 * r2;
        e1 += r1;
        e2 += r2;
        v1 += r1 * r1;
        v2 += r2 * r2;
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    e1 /= nf;
    e2 /= nf;
    v1 = v1 / nf - e1 * e1;
    v2 = v2 / nf - e2 * e2;
    if v1 <= 0.0 || v2 <= 0.0 {
        return 0.0;
    }
    -((cov / nf - e1 * e2) / (v1 * v2).sqrt())
}
