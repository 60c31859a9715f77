use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use structopt::StructOpt;
use tweets_gen_core::{BuildOptions, OversizedWordPolicy, SentenceBudget, SentenceSampler, WordGraph};

#[derive(Debug, StructOpt)]
#[structopt(name = "tweets", about = "Generate random tweets from a word-level Markov chain")]
struct Options {
	/// Seed of the random generator. Equal seeds give equal tweets.
	seed: u64,

	/// Number of tweets to generate.
	count: usize,

	/// Corpus file, split into words on whitespace.
	#[structopt(parse(from_os_str))]
	corpus: PathBuf,

	/// Number of words to read from the corpus. Reads everything if omitted.
	words_to_read: Option<usize>,

	/// Maximum number of words per tweet [default: 20]
	#[structopt(long)]
	max_words: Option<usize>,

	/// Maximum tweet length in bytes [default: 1000]
	#[structopt(long)]
	max_length: Option<usize>,

	/// Longest accepted word in bytes [default: 100]
	#[structopt(long)]
	max_word_length: Option<usize>,

	/// Fail on words longer than --max-word-length instead of skipping them.
	#[structopt(long)]
	reject_long_words: bool,

	/// Reuse (or write) a `.bin` word graph cache next to the corpus.
	#[structopt(long)]
	cache: bool,
}

impl Options {
	fn build_options(&self) -> BuildOptions {
		let defaults = BuildOptions::default();
		BuildOptions {
			words_to_read: self.words_to_read,
			max_word_length: self.max_word_length.unwrap_or(defaults.max_word_length),
			oversized_words: if self.reject_long_words {
				OversizedWordPolicy::Reject
			} else {
				OversizedWordPolicy::Skip
			},
		}
	}

	fn budget(&self) -> Result<SentenceBudget> {
		let mut budget = SentenceBudget::default();
		if let Some(max_words) = self.max_words {
			budget.set_max_words(max_words)?;
		}
		if let Some(max_length) = self.max_length {
			budget.set_max_length(max_length)?;
		}
		Ok(budget)
	}
}

fn main() -> Result<()> {
	env_logger::init();
	let options = Options::from_args();
	log::debug!("{:?}", options);

	let budget = options.budget()?;
	let graph = WordGraph::from_corpus_file(&options.corpus, &options.build_options(), options.cache)
		.with_context(|| format!("Failed to build word graph from {}", options.corpus.display()))?;

	let sampler = SentenceSampler::new(&graph, budget);
	let mut rng = StdRng::seed_from_u64(options.seed);

	for i in 1..=options.count {
		let tweet = sampler
			.generate_sentence(&mut rng)
			.with_context(|| format!("Failed to generate tweet {}", i))?;
		println!("Tweet {}: {}", i, tweet);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Options {
		Options::from_iter_safe(std::iter::once("tweets").chain(args.iter().copied())).unwrap()
	}

	#[test]
	fn positional_arguments_follow_the_classic_order() {
		let options = parse(&["42", "5", "corpus.txt", "1000"]);
		assert_eq!(options.seed, 42);
		assert_eq!(options.count, 5);
		assert_eq!(options.corpus, PathBuf::from("corpus.txt"));

		let build = options.build_options();
		assert_eq!(build.words_to_read, Some(1000));
		assert_eq!(build.oversized_words, OversizedWordPolicy::Skip);
		assert_eq!(options.budget().unwrap(), SentenceBudget::default());
	}

	#[test]
	fn words_to_read_defaults_to_everything() {
		let options = parse(&["1", "2", "corpus.txt"]);
		assert_eq!(options.build_options(), BuildOptions::default());
	}

	#[test]
	fn flags_override_limits() {
		let options = parse(&[
			"1",
			"2",
			"corpus.txt",
			"--max-words",
			"5",
			"--max-length",
			"80",
			"--max-word-length",
			"12",
			"--reject-long-words",
		]);
		assert_eq!(options.budget().unwrap(), SentenceBudget::new(5, 80).unwrap());
		let build = options.build_options();
		assert_eq!(build.max_word_length, 12);
		assert_eq!(build.oversized_words, OversizedWordPolicy::Reject);
	}

	#[test]
	fn zero_word_budget_is_refused() {
		let options = parse(&["1", "2", "corpus.txt", "--max-words", "0"]);
		assert!(options.budget().is_err());
	}

	#[test]
	fn missing_corpus_is_a_usage_error() {
		assert!(Options::from_iter_safe(["tweets", "1", "2"]).is_err());
	}
}
