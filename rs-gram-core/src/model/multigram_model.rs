use std::path::Path;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{GramError, Result};
use super::WordId;
use super::count_model::CountModel;
use super::generator::Generator;
use super::prediction_input::{PredictionInput, StartSeed};
use super::probability_model::ProbabilityModel;
use super::tokenizer;
use super::vocabulary::Vocabulary;

/// Word-level n-gram language model tracking every order up to
/// `step_max + 1` words.
///
/// This struct ties together:
/// - `vocabulary`: word <-> identifier mapping, grown while counting
/// - `counts`: raw n-gram counts, accumulated over every ingested text
/// - `probabilities`: next-word probabilities, a snapshot of `counts`
///   taken by [`MultiGramModel::compute_proba`]
///
/// # Lifecycle
/// 1. optionally seed the vocabulary with [`MultiGramModel::load_word_list`]
/// 2. [`MultiGramModel::ingest`] one or more texts
/// 3. [`MultiGramModel::compute_proba`]
/// 4. predict / generate, as many times as needed
///
/// Generation before step 3 finds no candidates. Ingesting after step 3
/// leaves the probabilities stale until they are computed again.
#[derive(Clone, Debug)]
pub struct MultiGramModel {
	vocabulary: Vocabulary,
	counts: CountModel,
	probabilities: ProbabilityModel,
	stale: bool,
}

impl MultiGramModel {
	/// Creates an empty model for n-grams of 1 to `step_max + 1` words.
	pub fn new(step_max: usize) -> Self {
		Self {
			vocabulary: Vocabulary::new(),
			counts: CountModel::new(step_max),
			probabilities: ProbabilityModel::empty(step_max),
			stale: false,
		}
	}

	/// Creates a model whose vocabulary is seeded from a word-list file.
	pub fn with_word_list<P: AsRef<Path>>(path: P, step_max: usize) -> Result<Self> {
		let mut model = Self::new(step_max);
		model.load_word_list(path)?;
		Ok(model)
	}

	pub fn step_max(&self) -> usize {
		self.counts.step_max()
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn counts(&self) -> &CountModel {
		&self.counts
	}

	pub fn probabilities(&self) -> &ProbabilityModel {
		&self.probabilities
	}

	/// Registers every word of a word-list file, see [`Vocabulary::load_word_list`].
	pub fn load_word_list<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
		self.vocabulary.load_word_list(path)
	}

	/// Counts every n-gram of a text file in one pass.
	///
	/// Unknown words are added to the vocabulary. Counts add up with
	/// previous passes, n-grams do not span two files.
	///
	/// # Returns
	/// The number of words read.
	///
	/// # Errors
	/// Returns an error if the file cannot be read. Words read before the
	/// failure stay counted and the probabilities are marked stale.
	pub fn ingest<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
		let path = path.as_ref();
		self.stale = true;
		let mut pass = self.counts.pass();
		for word in tokenizer::tokenize(path)? {
			pass.push(self.vocabulary.id_for(&word?));
		}
		let seen = pass.seen();
		drop(pass);

		info!("ingested {}: {} words, vocabulary size {}", path.display(), seen, self.vocabulary.len());
		Ok(seen)
	}

	/// Counts every n-gram of an in-memory text, same rules as [`MultiGramModel::ingest`].
	pub fn ingest_text(&mut self, text: &str) -> usize {
		let mut pass = self.counts.pass();
		for word in tokenizer::words(text) {
			pass.push(self.vocabulary.id_for(&word));
		}
		let seen = pass.seen();
		drop(pass);

		self.stale = true;
		seen
	}

	/// True when counts changed since the last [`MultiGramModel::compute_proba`].
	pub fn is_stale(&self) -> bool {
		self.stale
	}

	/// Derives the probability tables from the current counts.
	///
	/// Must run after the last ingestion and before any prediction.
	pub fn compute_proba(&mut self) -> Result<()> {
		self.probabilities = ProbabilityModel::compute(&self.counts)?;
		self.stale = false;
		Ok(())
	}

	/// Returns how many times the word sequence `words` was observed.
	///
	/// Never registers a word: a sequence holding an unknown word counts 0.
	///
	/// # Errors
	/// `LengthExceeded` if `words` is longer than `step_max + 1`.
	pub fn count_of<S: AsRef<str>>(&self, words: &[S]) -> Result<u64> {
		let max = self.step_max() + 1;
		if words.len() > max {
			return Err(GramError::LengthExceeded { len: words.len(), max });
		}
		let ids: Option<Vec<WordId>> = words.iter().map(|w| self.vocabulary.lookup(w.as_ref())).collect();
		match ids {
			Some(ids) => self.counts.count(&ids),
			None => Ok(0),
		}
	}

	/// Unigram count of a single word, 0 if unknown.
	pub fn count_of_word(&self, word: &str) -> u64 {
		self.vocabulary
			.lookup(word)
			.and_then(|idx| self.counts.count(&[idx]).ok())
			.unwrap_or(0)
	}

	fn generator(&self) -> Generator<'_> {
		if self.stale {
			warn!("predicting with probabilities older than the last ingestion");
		}
		Generator::new(&self.probabilities)
	}

	/// See [`Generator::predict_next`].
	pub fn predict_next(&self, context: &[WordId]) -> Result<WordId> {
		self.generator().predict_next(context)
	}

	/// See [`Generator::predict_next_random`].
	pub fn predict_next_random(&self, context: &[WordId]) -> Result<WordId> {
		self.generator().predict_next_random(context)
	}

	pub fn predict_next_random_with<R: Rng + ?Sized>(&self, context: &[WordId], rng: &mut R) -> Result<WordId> {
		self.generator().predict_next_random_with(context, rng)
	}

	/// See [`Generator::generate_n`].
	pub fn generate_n(&self, seed: &[WordId], n: usize) -> Result<Vec<WordId>> {
		self.generator().generate_n(seed, n)
	}

	/// See [`Generator::generate_n_random`].
	pub fn generate_n_random(&self, seed: &[WordId], n: usize) -> Result<Vec<WordId>> {
		self.generator().generate_n_random(seed, n)
	}

	pub fn generate_n_random_with<R: Rng + ?Sized>(
		&self,
		seed: &[WordId],
		n: usize,
		rng: &mut R,
	) -> Result<Vec<WordId>> {
		self.generator().generate_n_random_with(seed, n, rng)
	}

	/// Most probable word after the context `words`.
	pub fn predict_next_word<S: AsRef<str>>(&self, words: &[S]) -> Result<String> {
		let next = self.predict_next(&self.resolve(words)?)?;
		self.word(next)
	}

	/// Sampled word after the context `words`.
	pub fn predict_next_word_random<S: AsRef<str>>(&self, words: &[S]) -> Result<String> {
		let next = self.predict_next_random(&self.resolve(words)?)?;
		self.word(next)
	}

	/// Generates `n` words after `seed` with greedy selection.
	pub fn generate_n_words<S: AsRef<str>>(&self, seed: &[S], n: usize) -> Result<Vec<String>> {
		let nexts = self.generate_n(&self.resolve(seed)?, n)?;
		self.words(&nexts)
	}

	/// Generates `n` words after `seed` by sampling.
	pub fn generate_n_words_random<S: AsRef<str>>(&self, seed: &[S], n: usize) -> Result<Vec<String>> {
		let nexts = self.generate_n_random(&self.resolve(seed)?, n)?;
		self.words(&nexts)
	}

	/// Picks a random observed n-gram of `len` words, to seed a generation.
	pub fn random_seed<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Option<Vec<WordId>> {
		self.counts.random_ngram(len, rng)
	}

	/// Runs a complete generation described by `input`.
	///
	/// Returns the seed words followed by the generated words.
	///
	/// If `input.rng_seed` is set, the output is reproducible.
	pub fn generate(&self, input: &PredictionInput) -> Result<Vec<String>> {
		match input.rng_seed {
			Some(seed) => self.generate_with(input, &mut StdRng::seed_from_u64(seed)),
			None => self.generate_with(input, &mut rand::rng()),
		}
	}

	/// Same as [`MultiGramModel::generate`], drawing from `rng`.
	///
	/// # Behavior
	/// - `StartSeed::Random(len)` picks an observed n-gram of `len` words.
	/// - `StartSeed::Custom(words)` resolves the words without registering them.
	/// - `input.nb_words` words are then generated with `input.strategy`.
	///
	/// # Returns
	/// The seed words followed by the generated words.
	///
	/// # Errors
	/// - `InvalidInput` if no n-gram of the requested length was observed.
	/// - `UnknownWord` if a custom seed word is not in the vocabulary.
	/// - Any generation error, see [`Generator::generate_n`].
	pub fn generate_with<R: Rng + ?Sized>(&self, input: &PredictionInput, rng: &mut R) -> Result<Vec<String>> {
		let seed = match input.start_seed() {
			StartSeed::Random(len) => self
				.random_seed(*len, &mut *rng)
				.ok_or_else(|| GramError::InvalidInput(format!("no observed n-gram of {} words", len)))?,
			StartSeed::Custom(words) => self.resolve(words)?,
		};
		debug!("generating {} words with {:?} from {:?}", input.nb_words, input.strategy, seed);

		let nexts = self.generator().generate_with(input.strategy, &seed, input.nb_words, rng)?;
		let mut ids = seed;
		ids.extend(nexts);
		self.words(&ids)
	}

	/// Merges another model into this one.
	///
	/// # Behavior
	/// - Identifiers of `other` are translated through the words they stand
	///   for, words unknown here are registered.
	/// - Counts and statistics add up.
	///
	/// # Notes
	/// - Probabilities are stale afterwards and must be computed again.
	///
	/// # Errors
	/// `OrderMismatch` if the two models track different orders.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.step_max() != other.step_max() {
			return Err(GramError::OrderMismatch { left: self.step_max(), right: other.step_max() });
		}

		let mapping: Vec<WordId> = other.vocabulary.words().map(|word| self.vocabulary.id_for(word)).collect();
		self.counts.merge(&other.counts.remapped(&mapping))?;
		self.stale = true;
		Ok(())
	}

	/// Translates words to identifiers without registering anything.
	fn resolve<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<WordId>> {
		words
			.iter()
			.map(|w| {
				let w = w.as_ref();
				self.vocabulary.lookup(w).ok_or_else(|| GramError::UnknownWord(w.to_owned()))
			})
			.collect()
	}

	fn word(&self, idx: WordId) -> Result<String> {
		self.vocabulary
			.word_for(idx)
			.map(str::to_owned)
			.ok_or(GramError::UnresolvedIdentifier(idx))
	}

	fn words(&self, ids: &[WordId]) -> Result<Vec<String>> {
		ids.iter().map(|&idx| self.word(idx)).collect()
	}
}
