use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default maximum number of words in a generated sentence.
pub const MAX_WORDS_IN_SENTENCE: usize = 20;

/// Default maximum length of a generated sentence, in bytes.
pub const MAX_SENTENCE_LENGTH: usize = 1000;

/// Limits applied while a sentence is assembled.
///
/// # Invariants
/// - `max_words >= 1`
/// - `max_length >= 1`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SentenceBudget {
	/// Maximum number of words, start word included.
	max_words: usize,

	/// Maximum byte length of the sentence text, separators included.
	max_length: usize,
}

impl Default for SentenceBudget {
	fn default() -> Self {
		Self {
			max_words: MAX_WORDS_IN_SENTENCE,
			max_length: MAX_SENTENCE_LENGTH,
		}
	}
}

impl SentenceBudget {
	/// Creates a budget.
	///
	/// # Errors
	/// Returns `InvalidBudget` if either limit is zero.
	pub fn new(max_words: usize, max_length: usize) -> Result<Self> {
		let mut budget = Self::default();
		budget.set_max_words(max_words)?;
		budget.set_max_length(max_length)?;
		Ok(budget)
	}

	pub fn max_words(&self) -> usize {
		self.max_words
	}

	pub fn max_length(&self) -> usize {
		self.max_length
	}

	pub fn set_max_words(&mut self, max_words: usize) -> Result<()> {
		if max_words == 0 {
			return Err(Error::InvalidBudget("max_words must be at least 1".to_owned()));
		}
		self.max_words = max_words;
		Ok(())
	}

	pub fn set_max_length(&mut self, max_length: usize) -> Result<()> {
		if max_length == 0 {
			return Err(Error::InvalidBudget("max_length must be at least 1".to_owned()));
		}
		self.max_length = max_length;
		Ok(())
	}
}
