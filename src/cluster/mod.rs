//! Clustering algorithms.
//!
//! Missing-value tolerant K-Means: rows may have missing cells, metrics
//! compare only jointly observed dimensions, and centers average each
//! dimension over the rows that actually observed it.

mod cpu;
pub mod data;
pub mod error;
pub mod impl_generic;
pub mod traits;
mod validation;

pub use data::{DataSet, MISSING, is_missing};
pub use error::{ClusterError, ClusterResult};
pub use impl_generic::{ClusterEngine, CoclustMatrix, IterationReport};
pub use traits::tgl_kmeans::{
    AssignmentRecord, EngineState, MetricKind, TglKMeansAlgorithms, TglKMeansOptions,
    TglKMeansResult,
};
pub use validation::*;
