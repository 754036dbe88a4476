//! Clustering algorithm traits.

pub mod tgl_kmeans;
