use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::word_graph::{BuildOptions, WordGraph};
use crate::tokens::count_tokens;

/// Cache file layout: the options a graph was built with, then the graph.
#[derive(Deserialize)]
struct GraphCache {
	options: BuildOptions,
	graph: WordGraph,
}

#[derive(Serialize)]
struct GraphCacheRef<'a> {
	options: &'a BuildOptions,
	graph: &'a WordGraph,
}

/// Reads a whole corpus file into memory.
///
/// Invalid UTF-8 sequences are replaced rather than rejected: tokens are
/// only ever split on ASCII whitespace, never decoded further.
pub fn read_corpus<P: AsRef<Path>>(path: P) -> io::Result<String> {
	let bytes = fs::read(path)?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/corpus.txt` + `"bin"` → `data/corpus.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// True if `cache` exists and is not older than `corpus`.
pub fn is_cache_fresh<P: AsRef<Path>, Q: AsRef<Path>>(corpus: P, cache: Q) -> bool {
	let modified = |path: &Path| fs::metadata(path).and_then(|meta| meta.modified());
	match (modified(corpus.as_ref()), modified(cache.as_ref())) {
		(Ok(corpus), Ok(cache)) => cache >= corpus,
		_ => false,
	}
}

/// Serializes `graph` and the options it was built with to `path`.
pub fn save_graph<P: AsRef<Path>>(path: P, options: &BuildOptions, graph: &WordGraph) -> Result<()> {
	let bytes = postcard::to_stdvec(&GraphCacheRef { options, graph })?;
	fs::write(path, bytes)?;
	Ok(())
}

/// Loads a graph cache written by `save_graph`.
///
/// Returns `Ok(None)` if the cache was built with different options.
///
/// # Errors
/// - `Io` / `Serialization` if the file cannot be read or decoded
/// - `CorruptGraph` if the decoded graph breaks a construction invariant
pub fn load_graph<P: AsRef<Path>>(path: P, options: &BuildOptions) -> Result<Option<WordGraph>> {
	let bytes = fs::read(path)?;
	let cache: GraphCache = postcard::from_bytes(&bytes)?;
	if cache.options != *options {
		return Ok(None);
	}
	cache.graph.validate()?;
	Ok(Some(cache.graph))
}

impl WordGraph {
	/// Builds a graph from a corpus file.
	///
	/// With `use_cache`, a `.bin` file next to the corpus is used when it is
	/// at least as recent as the corpus and was built with the same options.
	/// Otherwise the corpus is tokenized and the cache (re)written.
	///
	/// A cache that cannot be read or written is logged and ignored: the
	/// graph is always built from the corpus in that case.
	pub fn from_corpus_file<P: AsRef<Path>>(path: P, options: &BuildOptions, use_cache: bool) -> Result<Self> {
		let path = path.as_ref();
		if !use_cache {
			return Self::from_corpus_text(path, options);
		}

		let cache_path = build_output_path(path, "bin")?;
		if is_cache_fresh(path, &cache_path) {
			match load_graph(&cache_path, options) {
				Ok(Some(graph)) => {
					log::info!("Loaded word graph from {}", cache_path.display());
					return Ok(graph);
				}
				Ok(None) => log::debug!("{} was built with other options, rebuilding", cache_path.display()),
				Err(e) => log::warn!("Ignoring unreadable cache {}: {}", cache_path.display(), e),
			}
		}

		let graph = Self::from_corpus_text(path, options)?;
		match save_graph(&cache_path, options, &graph) {
			Ok(()) => log::debug!("Wrote word graph cache {}", cache_path.display()),
			Err(e) => log::warn!("Could not write cache {}: {}", cache_path.display(), e),
		}
		Ok(graph)
	}

	fn from_corpus_text(path: &Path, options: &BuildOptions) -> Result<Self> {
		let text = read_corpus(path)?;
		log::debug!("{} holds {} tokens", path.display(), count_tokens(&text));
		Self::from_text(&text, options)
	}
}
