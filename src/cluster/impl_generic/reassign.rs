//! Parallel reassignment pass.
//!
//! Rows are fanned out over the rayon pool. Each worker folds its rows into a
//! private [`VoteBuffer`]; buffers are then merged and laid out positionally.
//! A row is owned by exactly one worker, so every assignment slot is written
//! once and the result does not depend on how rows were split.

use rayon::prelude::*;

use crate::cluster::data::{DataSet, MISSING, is_missing};
use crate::cluster::impl_generic::center::Center;

#[derive(Debug, Clone, Copy)]
struct RowVote {
    row: usize,
    center: usize,
    distance: f64,
}

/// Pending weight-1 votes collected by one worker.
#[derive(Debug, Default)]
pub struct VoteBuffer {
    votes: Vec<RowVote>,
    changes: usize,
    undistanceable: usize,
}

impl VoteBuffer {
    fn record(&mut self, row: usize, nearest: Nearest, previous: Option<usize>) {
        if previous != Some(nearest.center) {
            self.changes += 1;
        }
        if nearest.fallback {
            self.undistanceable += 1;
        }
        self.votes.push(RowVote {
            row,
            center: nearest.center,
            distance: nearest.distance,
        });
    }

    /// Combine two disjoint worker buffers.
    pub fn merge(mut self, mut other: Self) -> Self {
        if self.votes.len() < other.votes.len() {
            std::mem::swap(&mut self, &mut other);
        }
        self.votes.append(&mut other.votes);
        self.changes += other.changes;
        self.undistanceable += other.undistanceable;
        self
    }

    /// Number of votes held.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    fn into_outcome(self, n_rows: usize) -> ReassignOutcome {
        let mut labels = vec![0usize; n_rows];
        let mut distances = vec![MISSING; n_rows];
        let mut written = vec![false; n_rows];
        for vote in &self.votes {
            debug_assert!(!written[vote.row], "row {} voted twice", vote.row);
            written[vote.row] = true;
            labels[vote.row] = vote.center;
            distances[vote.row] = vote.distance;
        }
        debug_assert!(written.iter().all(|&w| w), "reassignment skipped a row");
        ReassignOutcome {
            labels,
            distances,
            changes: self.changes,
            undistanceable: self.undistanceable,
        }
    }
}

/// Nearest center of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Winning center index.
    pub center: usize,
    /// Distance to the winner, MISSING when no center was comparable.
    pub distance: f64,
    /// True when no center gave a usable distance and center 0 was used.
    pub fallback: bool,
}

/// Argmin over `centers`; ties go to the lowest index.
///
/// Any distance other than MISSING is usable, including `+inf` from an
/// overflowing Euclidean sum. A row with no usable distance to any center is
/// placed in center 0. Such rows carry no comparable information and voting
/// them anywhere leaves every center unchanged, since vote skips missing
/// cells.
pub fn nearest_center(row: &[f64], centers: &[Center]) -> Nearest {
    let mut best: Option<(usize, f64)> = None;
    for (j, center) in centers.iter().enumerate() {
        let dist = center.distance(row);
        if is_missing(dist) || dist.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((j, dist));
        }
    }
    match best {
        Some((center, distance)) => Nearest {
            center,
            distance,
            fallback: false,
        },
        None => Nearest {
            center: 0,
            distance: MISSING,
            fallback: true,
        },
    }
}

/// Merged result of one reassignment pass.
#[derive(Debug, Clone)]
pub struct ReassignOutcome {
    /// New center index of every row.
    pub labels: Vec<usize>,
    /// Distance of every row to its new center.
    pub distances: Vec<f64>,
    /// Rows whose center differs from the previous assignment.
    pub changes: usize,
    /// Rows placed by the center-0 fallback.
    pub undistanceable: usize,
}

impl ReassignOutcome {
    /// Vote every row (weight 1) into its new center, in row order.
    pub fn apply_votes(&self, data: &DataSet<'_>, centers: &mut [Center]) {
        for (row, &center) in self.labels.iter().enumerate() {
            centers[center].vote(data.row(row), 1.0);
        }
    }
}

/// Find the nearest center of every row against the current `centers`.
///
/// `previous` holds the assignment before the pass (`None` = unassigned).
/// Centers are only read; votes are returned, not applied.
pub fn reassign(data: &DataSet<'_>, centers: &[Center], previous: &[Option<usize>]) -> ReassignOutcome {
    let n = data.n_rows();
    debug_assert_eq!(previous.len(), n);

    let merged = (0..n)
        .into_par_iter()
        .fold(VoteBuffer::default, |mut buffer, i| {
            let nearest = nearest_center(data.row(i), centers);
            buffer.record(i, nearest, previous[i]);
            buffer
        })
        .reduce(VoteBuffer::default, VoteBuffer::merge);

    merged.into_outcome(n)
}
