use std::path::PathBuf;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use structopt::StructOpt;
use tweets_gen_core::{BuildOptions, Error, Sentence, SentenceBudget, SentenceSampler, WordGraph};

/// Upper bound of tweets per request.
const MAX_COUNT: usize = 100;

/// Redraws allowed per tweet when `min_words` is requested.
const MIN_WORDS_ATTEMPTS: usize = 20;

#[derive(Debug, StructOpt)]
#[structopt(name = "tweets-gen-server", about = "Serve random tweets over HTTP")]
struct Options {
	#[structopt(long, env = "TWEETS_HOST", default_value = "127.0.0.1")]
	host: String,
	#[structopt(long, env = "TWEETS_PORT", default_value = "5000")]
	port: u16,
	#[structopt(long, env = "TWEETS_CORPUS", parse(from_os_str))]
	corpus: PathBuf,
	#[structopt(long, env = "TWEETS_WORDS_TO_READ")]
	words_to_read: Option<usize>,
	/// Defaults to the number of CPUs.
	#[structopt(long, env = "TWEETS_WORKERS")]
	workers: Option<usize>,
	/// Reuse (or write) a `.bin` word graph cache next to the corpus.
	#[structopt(long)]
	cache: bool,
}

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<u64>, // OS entropy if missing
	count: Option<usize>,
	max_words: Option<usize>,
	max_length: Option<usize>,
	min_words: Option<usize>,
}

impl GenerateParams {
	fn budget(&self) -> Result<SentenceBudget, Error> {
		let mut budget = SentenceBudget::default();
		if let Some(max_words) = self.max_words {
			budget.set_max_words(max_words)?;
		}
		if let Some(max_length) = self.max_length {
			budget.set_max_length(max_length)?;
		}
		Ok(budget)
	}

	fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		}
	}
}

/// Built once at startup, then only read by the workers.
struct SharedData {
	graph: WordGraph,
}

fn error_response(error: Error) -> HttpResponse {
	match error {
		Error::EmptyOrDegenerateGraph | Error::InvalidBudget(_) => HttpResponse::UnprocessableEntity().body(error.to_string()),
		_ => {
			log::error!("Generation failed: {}", error);
			HttpResponse::InternalServerError().body(error.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns a JSON array of `{ "text", "word_count" }` objects.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let budget = match query.budget() {
		Ok(budget) => budget,
		Err(e) => return error_response(e),
	};

	let count = query.count.unwrap_or(1);
	if count > MAX_COUNT {
		return HttpResponse::BadRequest().body(format!("count must be at most {}", MAX_COUNT));
	}

	let sampler = SentenceSampler::new(&data.graph, budget);
	let mut rng = query.rng();
	let result: Result<Vec<Sentence>, Error> = match query.min_words {
		Some(min_words) => (0..count)
			.map(|_| sampler.generate_sentence_with_min_words(&mut rng, min_words, MIN_WORDS_ATTEMPTS))
			.collect(),
		None => sampler.generate(&mut rng, count),
	};

	match result {
		Ok(sentences) => HttpResponse::Ok().json(sentences),
		Err(e) => error_response(e),
	}
}

/// HTTP GET endpoint `/v1/stats`
#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.graph.stats())
}

/// Main entry point for the server.
///
/// Builds the word graph from the corpus once, then serves it read-only:
/// no lock is needed because sampling never mutates the graph.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let options = Options::from_args();

	let build_options = BuildOptions {
		words_to_read: options.words_to_read,
		..BuildOptions::default()
	};
	let graph = WordGraph::from_corpus_file(&options.corpus, &build_options, options.cache)
		.with_context(|| format!("Failed to build word graph from {}", options.corpus.display()))?;
	let shared_data = web::Data::new(SharedData { graph });

	let workers = options.workers.unwrap_or_else(num_cpus::get);
	log::info!("Listening on {}:{} with {} workers", options.host, options.port, workers);

	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_stats)
	})
		.workers(workers)
		.bind((options.host.as_str(), options.port))?
		.run()
		.await?;

	Ok(())
}
