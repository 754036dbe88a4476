//! Tie-aware ranking for Spearman correlation.
//!
//! Ranks are 1-based mid-ranks: when `t` consecutive sorted values are equal,
//! each receives the mean of the `t` positions they jointly occupy. Missing
//! cells never take part in ranking and receive [`RANK_EXCLUDED`].

use crate::cluster::data::is_missing;

/// Rank assigned to cells excluded from ranking.
pub const RANK_EXCLUDED: f64 = -f64::MAX;

/// Indices of the non-missing cells of `values`, sorted by value.
///
/// The sort is stable, so equal values keep their index order.
pub fn sorted_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len())
        .filter(|&i| !is_missing(values[i]))
        .collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// Mid-ranks of `values` along a precomputed sort `order`, restricted to the
/// positions accepted by `include`.
///
/// Every slot of `ranks` not ranked is set to [`RANK_EXCLUDED`]. Returns the
/// number of ranked cells.
pub fn mid_ranks_from_order<F>(values: &[f64], order: &[usize], include: F, ranks: &mut [f64]) -> usize
where
    F: Fn(usize) -> bool,
{
    ranks.fill(RANK_EXCLUDED);

    let kept: Vec<usize> = order.iter().copied().filter(|&i| include(i)).collect();
    let mut start = 0;
    while start < kept.len() {
        let v = values[kept[start]];
        let mut end = start + 1;
        while end < kept.len() && values[kept[end]] == v {
            end += 1;
        }
        // Positions start+1 ..= end share their mean.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &i in &kept[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    kept.len()
}

/// Mid-ranks of all non-missing cells of `values`.
pub fn mid_ranks(values: &[f64]) -> Vec<f64> {
    let order = sorted_order(values);
    let mut ranks = vec![RANK_EXCLUDED; values.len()];
    mid_ranks_from_order(values, &order, |_| true, &mut ranks);
    ranks
}
