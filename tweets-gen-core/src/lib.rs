//! Word-level Markov chain library for generating short pseudo-random tweets.
//!
//! This crate provides:
//! - A weighted successor graph built from a whitespace-split corpus
//! - A sentence sampler bounded by a word count and a byte length
//! - Corpus loading and an on-disk graph cache
//!
//! The crate performs no direct output. Drivers (CLI, HTTP server) seed the
//! random source, build the graph once and then sample it read-only.

/// Error taxonomy shared by construction, sampling and I/O.
pub mod error;

/// Word graph, sentence budget and sentence sampler.
pub mod model;

/// Whitespace tokenization of a corpus.
pub mod tokens;

/// Corpus reading and graph cache (de)serialization.
pub mod io;

pub use error::{Error, Result};
pub use model::budget::SentenceBudget;
pub use model::sampler::{Sentence, SentenceSampler};
pub use model::word::{SuccessorEdge, Word, WordId};
pub use model::word_graph::{BuildOptions, GraphStats, OversizedWordPolicy, WordGraph};
