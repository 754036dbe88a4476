//! Execution backends.

pub mod cpu;

pub use cpu::CpuClient;
