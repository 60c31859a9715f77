//! Top-level module for the word-graph tweet generator.
//!
//! This module provides:
//! - Unique words and their weighted successor edges (`Word`)
//! - The dictionary built from a token stream (`WordGraph`)
//! - Length and word-count limits for generated sentences (`SentenceBudget`)
//! - Bounded random walks over the graph (`SentenceSampler`)

/// A unique word and its weighted outgoing edges.
///
/// Handles transition counting and frequency-weighted successor sampling.
pub mod word;

/// Dictionary of unique words built in a single forward scan.
///
/// Owns every `Word`; edges only reference words by `WordId`.
pub mod word_graph;

/// Word-count and byte-length limits applied while sampling.
pub mod budget;

/// Sentence generation over an immutable `WordGraph`.
pub mod sampler;
