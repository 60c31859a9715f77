use std::collections::HashMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::word::{Word, WordId};
use crate::error::{Error, Result};
use crate::tokens::tokenize;

/// Default maximum length of a word, in bytes.
pub const MAX_WORD_LENGTH: usize = 100;

/// What to do with a token longer than `BuildOptions::max_word_length`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OversizedWordPolicy {
	/// Drop the token and keep scanning. The words around it become adjacent.
	#[default]
	Skip,
	/// Abort the build with `Error::WordTooLong`.
	Reject,
}

/// Parameters of a single graph construction pass.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
	/// Maximum number of tokens to consume, `None` reads the whole stream.
	/// Skipped oversized tokens count toward this limit.
	pub words_to_read: Option<usize>,

	/// Longest accepted token, in bytes.
	pub max_word_length: usize,

	pub oversized_words: OversizedWordPolicy,
}

impl Default for BuildOptions {
	fn default() -> Self {
		Self {
			words_to_read: None,
			max_word_length: MAX_WORD_LENGTH,
			oversized_words: OversizedWordPolicy::Skip,
		}
	}
}

/// Summary counters of a built graph.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphStats {
	pub words: usize,
	pub edges: usize,
	pub eligible_starts: usize,
	pub terminal_words: usize,
	pub tokens_read: usize,
	pub skipped_tokens: usize,
}

/// The dictionary: every unique word of the corpus and its successor edges.
///
/// # Responsibilities
/// - Build the graph from a token stream in a single forward scan
/// - Count word occurrences and word-to-word transitions
/// - Answer read-only queries during sentence generation
///
/// # Invariants
/// - At most one `Word` per distinct literal text
/// - Every edge target is a valid `WordId` of this graph
/// - Terminal words have no outgoing edges
///
/// The graph is immutable once built; sampling only borrows it, so it can be
/// shared between threads without locking.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct WordGraph {
	/// Word store, in order of first appearance.
	words: Vec<Word>,
	/// Exact-match, case-sensitive lookup from text to word.
	index: HashMap<String, WordId>,
	tokens_read: usize,
	skipped_tokens: usize,
}

impl WordGraph {
	/// Creates an empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a graph from an already split token stream.
	///
	/// For each token, in order:
	/// - look up or create its `Word` and count the occurrence
	/// - if the previous accepted word is not terminal, record the transition
	///   previous -> current
	///
	/// Construction stops after `options.words_to_read` tokens or when the
	/// stream is exhausted, whichever comes first.
	///
	/// # Errors
	/// - `WordTooLong` for an oversized token under `OversizedWordPolicy::Reject`
	/// - `AllocationFailure` if the word store or an edge list cannot grow
	///
	/// On error the partially built graph is dropped.
	pub fn build<I, S>(tokens: I, options: &BuildOptions) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut graph = Self::new();
		let mut previous: Option<WordId> = None;
		let limit = options.words_to_read.unwrap_or(usize::MAX);

		for token in tokens.into_iter().take(limit) {
			let token = token.as_ref();
			graph.tokens_read += 1;

			if token.len() > options.max_word_length {
				match options.oversized_words {
					OversizedWordPolicy::Skip => {
						log::debug!(
							"Skipping {}-byte token (limit {}): {:.32}...",
							token.len(),
							options.max_word_length,
							token
						);
						graph.skipped_tokens += 1;
						continue;
					}
					OversizedWordPolicy::Reject => {
						return Err(Error::WordTooLong {
							word: token.to_owned(),
							length: token.len(),
							max: options.max_word_length,
						});
					}
				}
			}

			let current = graph.add_occurrence(token)?;
			if let Some(previous) = previous {
				graph.add_transition(previous, current)?;
			}
			previous = Some(current);
		}

		log::info!(
			"Built word graph: {} words, {} edges from {} tokens ({} skipped)",
			graph.len(),
			graph.edge_count(),
			graph.tokens_read,
			graph.skipped_tokens
		);
		Ok(graph)
	}

	/// Tokenizes `text` on ASCII whitespace and builds the graph.
	pub fn from_text(text: &str, options: &BuildOptions) -> Result<Self> {
		Self::build(tokenize(text), options)
	}

	/// Looks up or creates the word for `token` and counts one occurrence.
	fn add_occurrence(&mut self, token: &str) -> Result<WordId> {
		let id = match self.index.get(token) {
			Some(id) => *id,
			None => {
				self.words.try_reserve(1)?;
				self.index.try_reserve(1)?;
				let id = WordId(self.words.len());
				self.words.push(Word::new(token));
				self.index.insert(token.to_owned(), id);
				id
			}
		};
		self.words[id.0].add_occurrence();
		Ok(id)
	}

	/// Records `from -> to` unless `from` ends a sentence.
	fn add_transition(&mut self, from: WordId, to: WordId) -> Result<()> {
		let word = &mut self.words[from.0];
		if word.is_sentence_terminal() {
			return Ok(());
		}
		word.add_transition(to)?;
		Ok(())
	}

	/// Number of unique words.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	pub fn id_of(&self, text: &str) -> Option<WordId> {
		self.index.get(text).copied()
	}

	pub fn get(&self, text: &str) -> Option<&Word> {
		self.id_of(text).map(|id| &self.words[id.0])
	}

	pub fn word(&self, id: WordId) -> Option<&Word> {
		self.words.get(id.0)
	}

	/// Iterates over all words in order of first appearance.
	pub fn words(&self) -> impl Iterator<Item = (WordId, &Word)> {
		self.words.iter().enumerate().map(|(i, word)| (WordId(i), word))
	}

	/// Words that are not terminal and have at least one successor.
	pub fn eligible_starts(&self) -> impl Iterator<Item = WordId> + '_ {
		self.words()
			.filter(|(_, word)| word.is_eligible_start())
			.map(|(id, _)| id)
	}

	/// Total number of distinct edges.
	pub fn edge_count(&self) -> usize {
		self.words.iter().map(|word| word.successors().len()).sum()
	}

	/// Number of times `to` was observed right after `from`, 0 if never.
	pub fn transition_count(&self, from: &str, to: &str) -> usize {
		let (Some(from), Some(to)) = (self.get(from), self.id_of(to)) else {
			return 0;
		};
		from.successors()
			.iter()
			.find(|edge| edge.target() == to)
			.map_or(0, |edge| edge.occurrences())
	}

	/// Tokens consumed by the build, including skipped ones.
	pub fn tokens_read(&self) -> usize {
		self.tokens_read
	}

	/// Oversized tokens dropped under `OversizedWordPolicy::Skip`.
	pub fn skipped_tokens(&self) -> usize {
		self.skipped_tokens
	}

	pub fn stats(&self) -> GraphStats {
		GraphStats {
			words: self.len(),
			edges: self.edge_count(),
			eligible_starts: self.eligible_starts().count(),
			terminal_words: self.words.iter().filter(|word| word.is_sentence_terminal()).count(),
			tokens_read: self.tokens_read,
			skipped_tokens: self.skipped_tokens,
		}
	}

	/// Checks the construction invariants.
	///
	/// A graph returned by `build` always passes; this guards graphs that
	/// were read back from disk.
	///
	/// # Errors
	/// Returns `CorruptGraph` describing the first violation found.
	pub fn validate(&self) -> Result<()> {
		if self.index.len() != self.words.len() {
			return Err(Error::CorruptGraph("word index and word store differ in size".to_owned()));
		}
		for (text, id) in &self.index {
			match self.words.get(id.0) {
				Some(word) if word.text() == text => (),
				_ => return Err(Error::CorruptGraph(format!("index entry {:?} is dangling", text))),
			}
		}
		for word in &self.words {
			word.check(self.words.len()).map_err(Error::CorruptGraph)?;
		}
		if self.skipped_tokens > self.tokens_read {
			return Err(Error::CorruptGraph("more tokens skipped than read".to_owned()));
		}
		Ok(())
	}
}

/// Direct access by id.
///
/// # Panics
/// If `id` was not issued by this graph.
impl Index<WordId> for WordGraph {
	type Output = Word;

	fn index(&self, id: WordId) -> &Word {
		&self.words[id.0]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn build(text: &str) -> WordGraph {
		WordGraph::from_text(text, &BuildOptions::default()).unwrap()
	}

	#[test]
	fn builds_cat_and_dog_graph() {
		let graph = build("the cat sat. the dog ran.");

		let texts: Vec<_> = graph.words().map(|(_, word)| word.text()).collect();
		assert_eq!(texts, ["the", "cat", "sat.", "dog", "ran."]);

		let the = graph.get("the").unwrap();
		assert_eq!(the.occurrences(), 2);
		assert_eq!(the.successors().len(), 2);
		assert_eq!(graph.transition_count("the", "cat"), 1);
		assert_eq!(graph.transition_count("the", "dog"), 1);

		for terminal in ["sat.", "ran."] {
			let word = graph.get(terminal).unwrap();
			assert!(word.is_sentence_terminal());
			assert!(word.successors().is_empty());
		}
		// "sat." is followed by "the" in the stream, but never records it.
		assert_eq!(graph.transition_count("sat.", "the"), 0);
	}

	#[test]
	fn counts_repeated_transitions_on_one_edge() {
		let graph = build("a b a b a c");
		assert_eq!(graph.transition_count("a", "b"), 2);
		assert_eq!(graph.transition_count("a", "c"), 1);
		assert_eq!(graph.transition_count("b", "a"), 2);
		assert_eq!(graph.get("a").unwrap().occurrences(), 3);
		assert_eq!(graph.get("a").unwrap().total_transitions(), 3);
		assert_eq!(graph.edge_count(), 3);
	}

	#[test]
	fn lookup_is_case_sensitive() {
		let graph = build("The the THE");
		assert_eq!(graph.len(), 3);
		assert_eq!(graph.id_of("the"), Some(WordId(1)));
		assert!(graph.get("tHe").is_none());
	}

	#[test]
	fn self_loops_are_recorded() {
		let graph = build("ha ha ha");
		assert_eq!(graph.len(), 1);
		assert_eq!(graph.transition_count("ha", "ha"), 2);
	}

	#[test]
	fn empty_stream_gives_empty_graph() {
		let graph = build("");
		assert!(graph.is_empty());
		assert_eq!(graph.edge_count(), 0);
		assert_eq!(graph.eligible_starts().count(), 0);
	}

	#[test]
	fn last_token_has_no_successor() {
		let graph = build("lonely");
		let word = graph.get("lonely").unwrap();
		assert!(!word.is_sentence_terminal());
		assert!(word.successors().is_empty());
		assert_eq!(graph.eligible_starts().count(), 0);
	}

	#[test]
	fn words_to_read_stops_mid_line() {
		let options = BuildOptions { words_to_read: Some(3), ..BuildOptions::default() };
		let graph = WordGraph::from_text("one two\nthree four five", &options).unwrap();
		assert_eq!(graph.len(), 3);
		assert!(graph.get("four").is_none());
		assert_eq!(graph.tokens_read(), 3);
		assert!(graph.get("three").unwrap().successors().is_empty());
	}

	#[test]
	fn words_to_read_beyond_stream_reads_everything() {
		let options = BuildOptions { words_to_read: Some(1_000), ..BuildOptions::default() };
		let graph = WordGraph::from_text("a b c", &options).unwrap();
		assert_eq!(graph.len(), 3);
		assert_eq!(graph.tokens_read(), 3);
	}

	#[test]
	fn oversized_token_is_skipped_and_neighbours_join() {
		let options = BuildOptions { max_word_length: 5, ..BuildOptions::default() };
		let graph = WordGraph::from_text("short toolongword tail", &options).unwrap();

		assert_eq!(graph.len(), 2);
		assert!(graph.get("toolongword").is_none());
		assert_eq!(graph.transition_count("short", "tail"), 1);
		assert_eq!(graph.skipped_tokens(), 1);
		assert_eq!(graph.tokens_read(), 3);
	}

	#[test]
	fn word_at_the_length_limit_is_kept() {
		let options = BuildOptions { max_word_length: 5, ..BuildOptions::default() };
		let graph = WordGraph::from_text("exact five5", &options).unwrap();
		assert!(graph.get("exact").is_some());
		assert!(graph.get("five5").is_some());
		assert_eq!(graph.skipped_tokens(), 0);
	}

	#[test]
	fn skipped_tokens_count_toward_the_read_limit() {
		let options = BuildOptions {
			words_to_read: Some(2),
			max_word_length: 3,
			..BuildOptions::default()
		};
		let graph = WordGraph::from_text("abc abcdef xyz", &options).unwrap();
		assert_eq!(graph.len(), 1);
		assert!(graph.get("xyz").is_none());
	}

	#[test]
	fn oversized_token_is_rejected_under_reject_policy() {
		let options = BuildOptions {
			max_word_length: 5,
			oversized_words: OversizedWordPolicy::Reject,
			..BuildOptions::default()
		};
		let err = WordGraph::from_text("short toolongword tail", &options).unwrap_err();
		match err {
			Error::WordTooLong { word, length, max } => {
				assert_eq!(word, "toolongword");
				assert_eq!(length, 11);
				assert_eq!(max, 5);
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn stats_summarise_the_graph() {
		let graph = build("the cat sat. the dog ran.");
		let stats = graph.stats();
		assert_eq!(stats.words, 5);
		assert_eq!(stats.edges, 4);
		assert_eq!(stats.eligible_starts, 3);
		assert_eq!(stats.terminal_words, 2);
		assert_eq!(stats.tokens_read, 6);
		assert_eq!(stats.skipped_tokens, 0);
	}

	#[test]
	fn built_graphs_validate() {
		let graph = build("a b. c d a c. a b.");
		assert!(graph.validate().is_ok());
	}

	#[test]
	fn validate_detects_zero_occurrence_word() {
		let mut graph = build("a b c");
		graph.words[1] = Word::new("b");
		assert!(matches!(graph.validate(), Err(Error::CorruptGraph(_))));
	}

	#[test]
	fn validate_detects_index_mismatch() {
		let mut graph = build("a b c");
		graph.index.remove("b");
		assert!(matches!(graph.validate(), Err(Error::CorruptGraph(_))));
	}
}
