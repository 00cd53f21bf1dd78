//! Calltree Studio
//!
//! Call-stream decoding and hotspot call-tree aggregation for profiling
//! collectors: a versioned binary decoder for agent call streams, a
//! query-predicate language for early rejection, dictionary and clob
//! metadata handling, and a bounded-memory hotspot tree with fragment
//! merging.
//!
//! This crate provides the core implementation for the `calltree` CLI
//! tool; the decoding and aggregation types are also usable as a library.

pub mod codec;
pub mod commands;
pub mod filter;
pub mod flamegraph;
pub mod meta;
pub mod model;
pub mod output;
pub mod tree;
pub mod utils;
