//! Core compile logic and pipeline orchestration for skillpack.
//!
//! This crate turns source text into skill items and a dependency graph
//! ([`compile`]), and ties compilation, artifact rendering and the output
//! store together into the end-to-end [`build_pack`] workflow.

pub mod compiler;
pub mod graph;
pub mod item;
pub mod pipeline;
pub mod scoring;

pub use compiler::{compile, compile_with, join_sources};
pub use graph::{MIN_EDGE_SIMILARITY, build_graph, jaccard};
pub use item::build_item;
pub use pipeline::{BuildPackResult, ProgressReporter, SilentProgress, build_pack};
pub use scoring::{routing_score, score_with_probe};
