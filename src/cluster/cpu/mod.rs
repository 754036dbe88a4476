//! CPU backend.

mod tgl_kmeans;
