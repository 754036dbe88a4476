//! Generic implementation of missing-value tolerant K-Means.

pub mod center;
pub mod coclust;
pub mod engine;
pub mod metric;
pub mod ranking;
pub mod reassign;
pub mod seeding;

pub use center::Center;
pub use coclust::CoclustMatrix;
pub use engine::{ClusterEngine, IterationReport};
pub use metric::Metric;
pub use reassign::{Nearest, ReassignOutcome, VoteBuffer, nearest_center, reassign};
pub use seeding::{ASSIGNED_DISTANCE, MinDistanceTable, SeedSelector};
