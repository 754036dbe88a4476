//! Clustering run state machine.
//!
//! ```text
//! Seeding ──► InitialReassign ──► Iterating ──┬──► Converged
//!                                             ├──► MaxIterReached
//!                                             └──► Aborted
//! ```
//!
//! Every iteration finalizes the centers from the previous votes, clears the
//! accumulators, reassigns all rows in parallel and votes them into their new
//! centers. The loop stops once the fraction of rows that changed cluster
//! drops to `min_delta` or `max_iter` iterations have run; the pending votes
//! are then finalized so the reported centers match the reported labels.

use std::ops::ControlFlow;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cluster::data::{DataSet, MISSING};
use crate::cluster::error::ClusterResult;
use crate::cluster::impl_generic::center::Center;
use crate::cluster::impl_generic::reassign::{ReassignOutcome, reassign};
use crate::cluster::impl_generic::seeding::SeedSelector;
use crate::cluster::traits::tgl_kmeans::{EngineState, TglKMeansOptions, TglKMeansResult};
use crate::cluster::validation::validate_options;

/// Progress after one reassignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// 0 for the initial reassignment, then 1, 2, ...
    pub iteration: usize,
    /// Rows whose cluster changed in this pass.
    pub changes: usize,
    /// `changes / n_rows`.
    pub change_fraction: f64,
}

/// Drives one clustering run over a borrowed data set.
pub struct ClusterEngine<'a> {
    data: DataSet<'a>,
    options: TglKMeansOptions,
    centers: Vec<Center>,
    assignment: Vec<Option<usize>>,
    distances: Vec<f64>,
    state: EngineState,
    n_iter: usize,
    changes: usize,
    undistanceable: usize,
    rng: StdRng,
}

impl<'a> ClusterEngine<'a> {
    /// Validate `options` against `data` and prepare a run.
    ///
    /// The seeding RNG comes from `options.seed`, or OS entropy when unset.
    pub fn new(data: DataSet<'a>, options: TglKMeansOptions) -> ClusterResult<Self> {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(data, options, rng)
    }

    /// Like [`ClusterEngine::new`] with an explicit RNG; `options.seed` is ignored.
    pub fn with_rng(data: DataSet<'a>, options: TglKMeansOptions, rng: StdRng) -> ClusterResult<Self> {
        validate_options(&options, data.n_rows(), "tgl_kmeans")?;
        let centers = (0..options.n_clusters)
            .map(|_| Center::new(data.n_cols(), options.metric))
            .collect();
        Ok(Self {
            data,
            centers,
            assignment: vec![None; data.n_rows()],
            distances: vec![MISSING; data.n_rows()],
            state: EngineState::Seeding,
            n_iter: 0,
            changes: 0,
            undistanceable: 0,
            rng,
            options,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn options(&self) -> &TglKMeansOptions {
        &self.options
    }

    /// Iterations completed after the initial reassignment.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    /// Current center values [k, d].
    pub fn centers_table(&self) -> Vec<Vec<f64>> {
        self.centers.iter().map(|c| c.values().to_vec()).collect()
    }

    /// Current cluster of every row; `None` only before the initial reassignment.
    pub fn assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    /// Choose the initial centers. No-op once seeding has completed.
    pub fn seed(&mut self) -> ClusterResult<()> {
        if self.state != EngineState::Seeding {
            return Ok(());
        }
        let mut selector = SeedSelector::new(self.data, self.options.n_clusters);
        selector.seed_all(&mut self.centers, &mut self.assignment, &mut self.rng)?;
        for center in &mut self.centers {
            center.reset();
        }
        self.state = EngineState::InitialReassign;
        debug!("seeding done, {} centers", self.centers.len());
        Ok(())
    }

    /// Advance by one phase.
    ///
    /// Returns a report for each reassignment pass, `None` for seeding and
    /// once the run is terminal.
    pub fn step(&mut self) -> ClusterResult<Option<IterationReport>> {
        match self.state {
            EngineState::Seeding => {
                self.seed()?;
                Ok(None)
            }
            EngineState::InitialReassign => {
                let report = self.reassign_all();
                self.state = EngineState::Iterating;
                Ok(Some(report))
            }
            EngineState::Iterating => {
                for center in &mut self.centers {
                    center.finalize();
                    center.reset();
                }
                self.n_iter += 1;
                let report = self.reassign_all();
                debug!(
                    "iteration {}: {} changes ({:.6})",
                    report.iteration, report.changes, report.change_fraction
                );
                if report.change_fraction <= self.options.min_delta {
                    self.finish(EngineState::Converged);
                } else if self.n_iter >= self.options.max_iter {
                    self.finish(EngineState::MaxIterReached);
                }
                Ok(Some(report))
            }
            EngineState::Converged | EngineState::MaxIterReached | EngineState::Aborted => Ok(None),
        }
    }

    /// Run to a terminal state.
    pub fn run(&mut self) -> ClusterResult<EngineState> {
        self.run_with(|_| ControlFlow::Continue(()))
    }

    /// Run to a terminal state, calling `on_iteration` after every
    /// reassignment. Returning `Break` stops the run as [`EngineState::Aborted`].
    pub fn run_with<F>(&mut self, mut on_iteration: F) -> ClusterResult<EngineState>
    where
        F: FnMut(&IterationReport) -> ControlFlow<()>,
    {
        info!(
            "tgl_kmeans: {} rows x {} cols, k={}, metric={}",
            self.data.n_rows(),
            self.data.n_cols(),
            self.options.n_clusters,
            self.options.metric
        );
        while !self.state.is_terminal() {
            let Some(report) = self.step()? else {
                continue;
            };
            if on_iteration(&report).is_break() && !self.state.is_terminal() {
                self.finish(EngineState::Aborted);
            }
        }
        info!(
            "tgl_kmeans: {:?} after {} iterations, {} changes in last pass",
            self.state, self.n_iter, self.changes
        );
        Ok(self.state)
    }

    /// Snapshot of the run.
    ///
    /// Labels are only meaningful once the initial reassignment has run
    /// (state `Iterating` or terminal). Before that, rows without a cluster
    /// are reported in cluster 0 with distance MISSING; use
    /// [`ClusterEngine::assignment`] to tell them apart.
    pub fn to_result(&self) -> TglKMeansResult {
        TglKMeansResult {
            centers: self.centers_table(),
            labels: self.assignment.iter().map(|a| a.unwrap_or(0)).collect(),
            distances: self.distances.clone(),
            n_iter: self.n_iter,
            changes: self.changes,
            n_undistanceable: self.undistanceable,
            state: self.state,
        }
    }

    pub fn into_result(self) -> TglKMeansResult {
        self.to_result()
    }

    fn reassign_all(&mut self) -> IterationReport {
        let outcome = reassign(&self.data, &self.centers, &self.assignment);
        self.apply(outcome);
        IterationReport {
            iteration: self.n_iter,
            changes: self.changes,
            change_fraction: self.changes as f64 / self.data.n_rows() as f64,
        }
    }

    fn apply(&mut self, outcome: ReassignOutcome) {
        outcome.apply_votes(&self.data, &mut self.centers);
        for (slot, &label) in self.assignment.iter_mut().zip(&outcome.labels) {
            *slot = Some(label);
        }
        self.changes = outcome.changes;
        self.undistanceable = outcome.undistanceable;
        self.distances = outcome.distances;
    }

    fn finish(&mut self, state: EngineState) {
        for center in &mut self.centers {
            center.finalize();
        }
        self.state = state;
    }
}
