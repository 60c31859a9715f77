use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::budget::SentenceBudget;
use super::word::{Word, WordId};
use super::word_graph::WordGraph;
use crate::error::{Error, Result};

/// A generated sentence and the number of words it holds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Sentence {
	text: String,
	word_count: usize,
}

impl Sentence {
	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn word_count(&self) -> usize {
		self.word_count
	}

	pub fn into_text(self) -> String {
		self.text
	}
}

impl fmt::Display for Sentence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// In-progress sentence of a single sampling call.
struct GenerationState<'g> {
	current: &'g Word,
	text: String,
	word_count: usize,
}

impl<'g> GenerationState<'g> {
	fn start(word: &'g Word) -> Self {
		Self {
			current: word,
			text: word.text().to_owned(),
			word_count: 1,
		}
	}

	/// No space follows a word that already carries sentence punctuation.
	fn separator(&self) -> &'static str {
		if self.current.is_sentence_terminal() { "" } else { " " }
	}

	fn push(&mut self, separator: &str, word: &'g Word) {
		self.text.push_str(separator);
		self.text.push_str(word.text());
		self.word_count += 1;
		self.current = word;
	}

	fn finish(self) -> Sentence {
		Sentence {
			text: self.text,
			word_count: self.word_count,
		}
	}
}

/// Samples bounded random walks from an immutable `WordGraph`.
///
/// # Responsibilities
/// - Precompute the eligible start words once
/// - Draw a uniform start word and frequency-weighted successors
/// - Stop before exceeding the `SentenceBudget`
///
/// The sampler only borrows the graph and takes the random source per
/// call, so one graph can serve any number of samplers and threads.
#[derive(Debug, Clone)]
pub struct SentenceSampler<'g> {
	graph: &'g WordGraph,
	budget: SentenceBudget,
	/// Non-terminal words with a successor that fit the length budget alone.
	starts: Vec<WordId>,
	/// Eligible start words of the graph before the length filter.
	graph_starts: usize,
}

impl<'g> SentenceSampler<'g> {
	pub fn new(graph: &'g WordGraph, budget: SentenceBudget) -> Self {
		let mut graph_starts = 0;
		let starts: Vec<WordId> = graph
			.eligible_starts()
			.inspect(|_| graph_starts += 1)
			.filter(|id| graph[*id].text().len() <= budget.max_length())
			.collect();

		if graph_starts == 0 {
			log::warn!("Word graph of {} words has no eligible start word", graph.len());
		} else if starts.is_empty() {
			log::warn!("None of {} start words fits in {} bytes", graph_starts, budget.max_length());
		} else {
			log::debug!("{} eligible start words out of {}", starts.len(), graph.len());
		}

		Self { graph, budget, starts, graph_starts }
	}

	/// Why no sentence can be started: the graph itself, or a budget too
	/// short for every start word.
	fn no_start_error(&self) -> Error {
		if self.graph_starts == 0 {
			Error::EmptyOrDegenerateGraph
		} else {
			Error::InvalidBudget(format!(
				"max_length of {} bytes is shorter than every start word",
				self.budget.max_length()
			))
		}
	}

	pub fn graph(&self) -> &'g WordGraph {
		self.graph
	}

	pub fn budget(&self) -> SentenceBudget {
		self.budget
	}

	pub fn eligible_starts(&self) -> &[WordId] {
		&self.starts
	}

	/// Uniform draw over the eligible start words.
	///
	/// Same distribution as drawing over every word and redrawing terminal
	/// or dead-end words, but always terminates.
	fn choose_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&'g Word> {
		if self.starts.is_empty() {
			return Err(self.no_start_error());
		}
		let graph = self.graph;
		let id = self.starts[rng.random_range(0..self.starts.len())];
		Ok(&graph[id])
	}

	/// Generates one sentence.
	///
	/// Starting from a uniformly drawn eligible word, successors are drawn
	/// weighted by edge count and appended with a single space. Generation
	/// stops, keeping what was built so far, when:
	/// - the sentence holds `max_words` words
	/// - the next separator would exceed `max_length`
	/// - the next word would exceed `max_length`
	/// - the current word has no successor
	///
	/// # Errors
	/// - `EmptyOrDegenerateGraph` if the graph has no eligible start word
	/// - `InvalidBudget` if it has some, but none fits in `max_length`
	pub fn generate_sentence<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Sentence> {
		let graph = self.graph;
		let max_words = self.budget.max_words();
		let max_length = self.budget.max_length();

		let mut state = GenerationState::start(self.choose_start(rng)?);

		while state.word_count < max_words {
			let separator = state.separator();
			if state.text.len() + separator.len() > max_length {
				break;
			}

			let Some(next) = state.current.choose_successor(rng) else {
				break;
			};
			let next = &graph[next];

			if state.text.len() + separator.len() + next.text().len() > max_length {
				break;
			}
			state.push(separator, next);
		}

		Ok(state.finish())
	}

	/// Generates a sentence of at least `min_words` words if possible.
	///
	/// Redraws up to `attempts` extra times while the sentence is too short.
	/// If every attempt falls short, the last sentence drawn is returned.
	pub fn generate_sentence_with_min_words<R: Rng + ?Sized>(
		&self,
		rng: &mut R,
		min_words: usize,
		attempts: usize,
	) -> Result<Sentence> {
		let mut sentence = self.generate_sentence(rng)?;
		let mut remaining = attempts;

		while sentence.word_count() < min_words && remaining > 0 {
			sentence = self.generate_sentence(rng)?;
			remaining -= 1;
		}

		Ok(sentence)
	}

	/// Generates `count` sentences in order from the same random stream.
	pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<Sentence>> {
		if self.starts.is_empty() {
			return Err(self.no_start_error());
		}
		(0..count).map(|_| self.generate_sentence(rng)).collect()
	}
}
