// src/core/call_graph/mod.rs
//! Call matrix construction and connectivity ordering
//!
//! Per-file scans are merged into one call map, filtered against the set of
//! declared routines and laid out as a callee × caller matrix that can be
//! reordered by how connected each routine is.

mod matrix;
mod assembler;
mod reorder;

pub use matrix::AdjacencyMatrix;
pub use assembler::{CallGraphAssembler, CallGraphStats, FileScan};
pub use reorder::reorder_by_sum;
