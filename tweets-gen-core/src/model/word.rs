use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;

/// Character marking a word as the end of a sentence.
pub const SENTENCE_END: char = '.';

/// Index of a `Word` inside its `WordGraph`.
///
/// Edges hold a `WordId` rather than the word itself: the graph is the
/// single owner of every word.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordId(pub(crate) usize);

impl WordId {
	/// Position of the word in the graph's word store.
	pub fn index(self) -> usize {
		self.0
	}
}

/// A directed, weighted transition toward `target`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SuccessorEdge {
	target: WordId,
	/// How many times `target` immediately followed the source word.
	occurrences: usize,
}

impl SuccessorEdge {
	pub fn target(&self) -> WordId {
		self.target
	}

	pub fn occurrences(&self) -> usize {
		self.occurrences
	}
}

/// One unique token of the corpus.
///
/// Conceptually a node of a first-order Markov chain: outgoing edges are
/// weighted by their number of observations.
///
/// ## Invariants
/// - Edge targets are distinct
/// - Every edge occurrence count is strictly positive
/// - `total_transitions` is the sum of all edge occurrence counts
/// - A terminal word never has edges (enforced by `WordGraph`)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Word {
	text: String,
	occurrences: usize,
	terminal: bool,
	successors: Vec<SuccessorEdge>,
	total_transitions: usize,
}

impl Word {
	/// Creates a word that has not been counted yet.
	pub(crate) fn new(text: &str) -> Self {
		Self {
			text: text.to_owned(),
			occurrences: 0,
			terminal: text.contains(SENTENCE_END),
			successors: Vec::new(),
			total_transitions: 0,
		}
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	/// Number of times this exact token appeared in the accepted stream.
	pub fn occurrences(&self) -> usize {
		self.occurrences
	}

	/// True iff the text contains a period.
	pub fn is_sentence_terminal(&self) -> bool {
		self.terminal
	}

	pub fn successors(&self) -> &[SuccessorEdge] {
		&self.successors
	}

	/// Sum of the occurrence counts of all outgoing edges.
	pub fn total_transitions(&self) -> usize {
		self.total_transitions
	}

	/// A word can open a sentence when it is not terminal and has a successor.
	pub fn is_eligible_start(&self) -> bool {
		!self.terminal && !self.successors.is_empty()
	}

	pub(crate) fn add_occurrence(&mut self) {
		self.occurrences += 1;
	}

	/// Records one observation of `target` right after this word.
	///
	/// - If the edge already exists, its occurrence count is increased.
	/// - Otherwise, a new edge is created with an initial count of 1.
	pub(crate) fn add_transition(&mut self, target: WordId) -> Result<(), TryReserveError> {
		match self.successors.iter_mut().find(|edge| edge.target == target) {
			Some(edge) => edge.occurrences += 1,
			None => {
				self.successors.try_reserve(1)?;
				self.successors.push(SuccessorEdge { target, occurrences: 1 });
			}
		}
		self.total_transitions += 1;
		Ok(())
	}

	/// Draws a successor with probability proportional to its edge count.
	///
	/// Equivalent to drawing uniformly from a pool where every edge appears
	/// `occurrences` times, without building the pool: a single draw in
	/// `0..total_transitions` followed by a cumulative subtraction.
	///
	/// Returns `None` if the word has no successors.
	pub fn choose_successor<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<WordId> {
		if self.total_transitions == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total_transitions);
		for edge in &self.successors {
			if r < edge.occurrences {
				return Some(edge.target);
			}
			r -= edge.occurrences;
		}

		// Unreachable while total_transitions matches the edge counts.
		self.successors.last().map(|edge| edge.target)
	}

	/// Checks the per-word invariants; used on graphs read from disk.
	pub(crate) fn check(&self, word_count: usize) -> Result<(), String> {
		if self.occurrences == 0 {
			return Err(format!("word {:?} never occurs", self.text));
		}
		if self.terminal != self.text.contains(SENTENCE_END) {
			return Err(format!("terminal flag of {:?} does not match its text", self.text));
		}
		if self.terminal && !self.successors.is_empty() {
			return Err(format!("terminal word {:?} has successors", self.text));
		}

		let mut sum = 0;
		for (i, edge) in self.successors.iter().enumerate() {
			if edge.target.0 >= word_count {
				return Err(format!("edge of {:?} points outside the graph", self.text));
			}
			if edge.occurrences == 0 {
				return Err(format!("edge of {:?} has a zero count", self.text));
			}
			if self.successors[..i].iter().any(|other| other.target == edge.target) {
				return Err(format!("duplicate edge from {:?}", self.text));
			}
			sum += edge.occurrences;
		}
		if sum != self.total_transitions {
			return Err(format!("transition total of {:?} does not match its edges", self.text));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn terminal_iff_text_contains_a_period() {
		assert!(Word::new("end.").is_sentence_terminal());
		assert!(Word::new("e.g").is_sentence_terminal());
		assert!(!Word::new("end!").is_sentence_terminal());
	}

	#[test]
	fn repeated_transition_increments_the_same_edge() {
		let mut word = Word::new("the");
		word.add_transition(WordId(1)).unwrap();
		word.add_transition(WordId(2)).unwrap();
		word.add_transition(WordId(1)).unwrap();

		assert_eq!(word.successors().len(), 2);
		assert_eq!(word.successors()[0].target(), WordId(1));
		assert_eq!(word.successors()[0].occurrences(), 2);
		assert_eq!(word.successors()[1].occurrences(), 1);
		assert_eq!(word.total_transitions(), 3);
		assert!(word.is_eligible_start());
	}

	#[test]
	fn word_without_successors_yields_none() {
		let word = Word::new("alone");
		let mut rng = StdRng::seed_from_u64(7);
		assert_eq!(word.choose_successor(&mut rng), None);
		assert!(!word.is_eligible_start());
	}

	#[test]
	fn successor_frequency_follows_edge_weights() {
		let mut word = Word::new("from");
		for _ in 0..3 {
			word.add_transition(WordId(1)).unwrap();
		}
		word.add_transition(WordId(2)).unwrap();

		let mut rng = StdRng::seed_from_u64(42);
		let draws = 200_000;
		let hits = (0..draws)
			.filter(|_| word.choose_successor(&mut rng) == Some(WordId(1)))
			.count();

		assert_abs_diff_eq!(hits as f64 / draws as f64, 0.75, epsilon = 0.01);
	}

	#[test]
	fn check_rejects_out_of_bounds_edges() {
		let mut word = Word::new("a");
		word.add_occurrence();
		word.add_transition(WordId(5)).unwrap();
		assert!(word.check(6).is_ok());
		assert!(word.check(5).is_err());
	}

	#[test]
	fn check_rejects_words_that_never_occur() {
		let mut word = Word::new("ghost");
		assert_eq!(word.occurrences(), 0);
		assert!(word.check(1).is_err());

		word.add_occurrence();
		assert!(word.check(1).is_ok());
	}
}
