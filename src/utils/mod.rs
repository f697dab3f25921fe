//! Internal building blocks shared by the analyses.
//!
//! - [`BitSet`] - dense sets of small integers (variable ids, block ids)
//! - [`graph`] - a directed graph with typed edges and traversal orders

mod bitset;
pub(crate) mod graph;

pub use bitset::BitSet;
