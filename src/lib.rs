//! tglkmeans - Missing-value tolerant K-Means clustering
//!
//! tglkmeans partitions the rows of a numeric matrix into k clusters when
//! cells may be missing. Rows are compared only over the dimensions both
//! sides observed, and each center dimension is the mean over exactly the
//! rows that observed it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            TglKMeansAlgorithms (CpuClient)               │
//! │         (validation, thread pool, result table)         │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │ drives
//! ┌──────────────────────────▼──────────────────────────────┐
//! │                     ClusterEngine                        │
//! │   seeding ─► reassign (rayon fold/reduce) ─► finalize   │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │ uses
//! ┌──────────────────────────▼──────────────────────────────┐
//! │              Center + Metric                             │
//! │       (euclid, pearson, spearman; vote/finalize)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cluster`] - Data view, metrics, centers, seeding, the engine and the
//!   co-clustering counts used for bootstrap stability runs
//! - [`runtime`] - CPU client owning the worker pool
//!
//! # Missing cells
//!
//! A cell equal to [`MISSING`] (`f64::MAX`) is "not measured". NaN and
//! infinities are rejected when the [`DataSet`] is built.
//!
//! # Determinism
//!
//! With a fixed `seed` the result is identical for any number of worker
//! threads: rows are reassigned independently and their votes are applied
//! in row order.
//!
//! ## Usage
//!
//! ```
//! use tglkmeans::{CpuClient, DataSet, MetricKind, TglKMeansAlgorithms, TglKMeansOptions};
//!
//! let values = [0.0, 1.0, 10.0, 11.0];
//! let data = DataSet::new(&values, 4, 1).unwrap();
//! let options = TglKMeansOptions::new(2, MetricKind::Euclid).with_seed(1);
//!
//! let result = CpuClient::new().tgl_kmeans(&data, &options).unwrap();
//! assert_eq!(result.labels[0], result.labels[1]);
//! assert_ne!(result.labels[0], result.labels[2]);
//! ```

pub mod cluster;
pub mod runtime;

// Re-export main types for convenience
pub use cluster::{
    AssignmentRecord, ClusterEngine, ClusterError, ClusterResult, CoclustMatrix, DataSet,
    EngineState, IterationReport, MISSING, MetricKind, TglKMeansAlgorithms, TglKMeansOptions,
    TglKMeansResult, is_missing,
};
pub use runtime::CpuClient;
