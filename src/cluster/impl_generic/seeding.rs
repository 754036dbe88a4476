//! Farthest-quantile probabilistic seeding.
//!
//! Seeds are chosen one at a time. After the first (uniform) pick, every
//! unassigned row keeps its distance to the nearest center seen so far; the
//! next seed is drawn uniformly from a window of that sorted list sitting just
//! below the `1 - 1/(2k)` quantile, i.e. from rows poorly explained by the
//! current centers without always taking the single farthest one.
//!
//! Each new center then claims the `max(1, N/(2k))` unassigned rows closest to
//! it, so that every center starts from a populated support set.

use std::cmp::Ordering;

use log::{debug, info, trace};
use rand::Rng;
use rayon::prelude::*;

use crate::cluster::data::{DataSet, MISSING, is_missing};
use crate::cluster::error::{ClusterError, ClusterResult};
use crate::cluster::impl_generic::center::Center;

/// Table marker for rows already claimed by a center.
///
/// Lower than any distance a metric can return, including negated
/// correlations.
pub const ASSIGNED_DISTANCE: f64 = -f64::MAX;

fn by_distance_then_row(a: &(f64, usize), b: &(f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

/// Best distance of every row to the centers seeded so far.
#[derive(Debug, Clone)]
pub struct MinDistanceTable {
    best: Vec<f64>,
}

impl MinDistanceTable {
    /// Table for `n_rows` rows, all at MISSING ("infinitely far").
    pub fn new(n_rows: usize) -> Self {
        Self {
            best: vec![MISSING; n_rows],
        }
    }

    /// Recorded distance of `row`.
    pub fn distance(&self, row: usize) -> f64 {
        self.best[row]
    }

    /// Fold in the distances to the most recently added center.
    ///
    /// Rows already assigned are marked with [`ASSIGNED_DISTANCE`] and never
    /// evaluated again.
    pub fn update(&mut self, data: &DataSet<'_>, newest: &Center, assignment: &[Option<usize>]) {
        self.best
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, best)| {
                if assignment[i].is_some() {
                    *best = ASSIGNED_DISTANCE;
                } else if *best != ASSIGNED_DISTANCE {
                    let dist = newest.distance(data.row(i));
                    if !is_missing(dist) && (is_missing(*best) || dist < *best) {
                        *best = dist;
                    }
                }
            });
    }

    /// Unassigned rows as `(distance, row)`, sorted by ascending distance.
    ///
    /// Rows still at MISSING (not comparable with any center yet) sort after
    /// every finite distance.
    pub fn candidates(&self) -> Vec<(f64, usize)> {
        let mut candidates: Vec<(f64, usize)> = self
            .best
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d != ASSIGNED_DISTANCE)
            .map(|(i, &d)| (d, i))
            .collect();
        candidates.sort_unstable_by(by_distance_then_row);
        candidates
    }
}

/// Half-open window `[from, to)` of the sorted candidate list to sample from.
///
/// `to = floor(valid * (1 - 1/(2k)))`, `from = to - floor(n_rows / k)`, both
/// clamped to the list.
pub fn seed_window(valid: usize, n_rows: usize, k: usize) -> (usize, usize) {
    let quantile = 1.0 - 1.0 / (2.0 * k as f64);
    let to = ((valid as f64 * quantile).floor() as usize).min(valid);
    let from = to.saturating_sub(n_rows / k);
    (from, to)
}

/// Chooses the k initial centers.
pub struct SeedSelector<'a> {
    data: DataSet<'a>,
    k: usize,
    table: MinDistanceTable,
}

impl<'a> SeedSelector<'a> {
    pub fn new(data: DataSet<'a>, k: usize) -> Self {
        Self {
            data,
            k,
            table: MinDistanceTable::new(data.n_rows()),
        }
    }

    /// Current min-distance table.
    pub fn table(&self) -> &MinDistanceTable {
        &self.table
    }

    /// First seed: a uniformly random row with at least one valid cell.
    ///
    /// Draws up to N times before giving up.
    pub fn select_first<R: Rng + ?Sized>(&self, rng: &mut R) -> ClusterResult<usize> {
        let n = self.data.n_rows();
        for _ in 0..n {
            let row = ((rng.random::<f64>() * n as f64) as usize).min(n - 1);
            if self.data.has_valid_cell(row) {
                return Ok(row);
            }
            trace!("seed 0: row {row} is entirely missing, redrawing");
        }
        Err(ClusterError::SeedingExhausted {
            seed: 0,
            reason: format!("no row with a non-missing cell found in {n} draws"),
        })
    }

    /// Seed `seed_index` (>= 1), given the center added in the previous round.
    pub fn select_next<R: Rng + ?Sized>(
        &mut self,
        seed_index: usize,
        newest: &Center,
        assignment: &[Option<usize>],
        rng: &mut R,
    ) -> ClusterResult<usize> {
        self.table.update(&self.data, newest, assignment);
        let candidates = self.table.candidates();
        let valid = candidates.len();
        if valid == 0 {
            return Err(ClusterError::SeedingExhausted {
                seed: seed_index,
                reason: "every row is already assigned".to_string(),
            });
        }

        let (from, to) = seed_window(valid, self.data.n_rows(), self.k);
        trace!("seed {seed_index}: window [{from}, {to}) of {valid} candidates");

        let attempts = (to - from).max(1);
        for _ in 0..attempts {
            let idx = if to > from {
                from + (rng.random::<f64>() * (to - from) as f64) as usize
            } else {
                to
            }
            .min(valid - 1);
            let (dist, row) = candidates[idx];
            if self.data.has_valid_cell(row) {
                debug!("seed {seed_index}: picked row {row} at distance {dist}");
                return Ok(row);
            }
        }

        // Window held only entirely-missing rows: take the farthest usable one.
        candidates
            .iter()
            .rev()
            .map(|&(_, row)| row)
            .find(|&row| self.data.has_valid_cell(row))
            .inspect(|row| debug!("seed {seed_index}: window exhausted, fell back to row {row}"))
            .ok_or_else(|| ClusterError::SeedingExhausted {
                seed: seed_index,
                reason: format!("none of the {valid} unassigned rows has a non-missing cell"),
            })
    }

    /// Initialize `center` from `seed_row`, then hand it the closest
    /// unassigned rows.
    ///
    /// Returns the number of rows assigned to `center_index`.
    pub fn bootstrap_center(
        &self,
        seed_row: usize,
        center_index: usize,
        center: &mut Center,
        assignment: &mut [Option<usize>],
    ) -> usize {
        let data = &self.data;
        center.reset();
        center.vote(data.row(seed_row), 1.0);
        center.finalize();

        let frozen: &Center = center;
        let unassigned: &[Option<usize>] = assignment;
        let mut nearest: Vec<(f64, usize)> = (0..data.n_rows())
            .into_par_iter()
            .filter(|&i| unassigned[i].is_none())
            .filter_map(|i| {
                let dist = frozen.distance(data.row(i));
                (!is_missing(dist)).then_some((dist, i))
            })
            .collect();

        if nearest.is_empty() {
            if assignment[seed_row].is_none() {
                assignment[seed_row] = Some(center_index);
            }
            return 1;
        }

        let take = (data.n_rows() / (2 * self.k)).max(1).min(nearest.len());
        if take < nearest.len() {
            nearest.select_nth_unstable_by(take, by_distance_then_row);
            nearest.truncate(take);
        }
        nearest.sort_unstable_by(by_distance_then_row);

        center.reset();
        for &(_, row) in &nearest {
            assignment[row] = Some(center_index);
            center.vote(data.row(row), 1.0);
        }
        center.finalize();
        nearest.len()
    }

    /// Seed every center in turn.
    ///
    /// On return each center holds the mean of the rows it claimed, and
    /// `assignment` records those claims. Accumulated votes are left in the
    /// centers; the caller resets them before the first full reassignment.
    pub fn seed_all<R: Rng + ?Sized>(
        &mut self,
        centers: &mut [Center],
        assignment: &mut [Option<usize>],
        rng: &mut R,
    ) -> ClusterResult<()> {
        debug_assert_eq!(centers.len(), self.k);
        info!("generating {} seeds over {} rows", self.k, self.data.n_rows());
        for i in 0..self.k {
            let seed_row = if i == 0 {
                self.select_first(rng)?
            } else {
                self.select_next(i, &centers[i - 1], assignment, rng)?
            };
            let claimed = self.bootstrap_center(seed_row, i, &mut centers[i], assignment);
            debug!("seed {i}: row {seed_row} claimed {claimed} rows");
        }
        Ok(())
    }
}
