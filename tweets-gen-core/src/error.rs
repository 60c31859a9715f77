use std::collections::TryReserveError;

use thiserror::Error;

/// Errors raised while building, loading or sampling a word graph.
///
/// Construction errors abort the whole build: no partial graph is ever
/// handed back. Sampling errors are per call and leave the graph untouched.
#[derive(Debug, Error)]
pub enum Error {
	/// A token is longer than `BuildOptions::max_word_length` and the build
	/// runs with `OversizedWordPolicy::Reject`.
	#[error("word of {length} bytes exceeds the {max} byte limit: {word:?}")]
	WordTooLong { word: String, length: usize, max: usize },

	/// No word can start a sentence: the graph is empty, every word is
	/// terminal, or no non-terminal word has a successor.
	#[error("word graph has no eligible start word")]
	EmptyOrDegenerateGraph,

	#[error("allocation failed while growing the word graph: {0}")]
	AllocationFailure(#[from] TryReserveError),

	#[error("invalid sentence budget: {0}")]
	InvalidBudget(String),

	/// A graph read from disk breaks one of the construction invariants.
	#[error("corrupt word graph: {0}")]
	CorruptGraph(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
