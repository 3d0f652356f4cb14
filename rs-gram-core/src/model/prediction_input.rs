use serde::{Deserialize, Serialize};

use crate::error::{GramError, Result};
use super::generator::Strategy;

/// Strategy used to select the starting seed when generating a sequence.
///
/// # Variants
/// - `Random(usize)`: a random n-gram of the given length observed during
///   training.
/// - `Custom(Vec<String>)`: the given words, in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartSeed {
	Random(usize),
	Custom(Vec<String>),
}

/// Input parameters for one generation call.
///
/// Can be built in code or read from JSON, missing fields take their
/// default value:
///
/// ```json
/// { "nb_words": 12, "strategy": "softmax", "start_seed": { "custom": ["the"] }, "rng_seed": 7 }
/// ```
///
/// # Invariants
/// - `Random` seeds have a length of at least 1
/// - `Custom` seeds hold at least one word
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionInput {
	/// Number of words to generate after the seed.
	pub nb_words: usize,

	/// Greedy or softmax selection.
	pub strategy: Strategy,

	/// Optional fixed RNG seed, for reproducible softmax generation and
	/// random start seeds.
	pub rng_seed: Option<u64>,

	start_seed: StartSeed,
}

impl Default for PredictionInput {
	fn default() -> Self {
		Self {
			nb_words: 30,
			strategy: Strategy::Greedy,
			rng_seed: None,
			start_seed: StartSeed::Random(1),
		}
	}
}

impl PredictionInput {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current start seed.
	pub fn start_seed(&self) -> &StartSeed {
		&self.start_seed
	}

	/// Starts generation from a random observed n-gram of `len` words.
	///
	/// # Errors
	/// Returns an error if `len` is 0.
	pub fn set_random_seed(&mut self, len: usize) -> Result<()> {
		if len == 0 {
			return Err(GramError::InvalidInput("random seed length must be >= 1".to_owned()));
		}
		self.start_seed = StartSeed::Random(len);
		Ok(())
	}

	/// Starts generation from the given words.
	///
	/// # Errors
	/// Returns an error if `words` is empty.
	pub fn set_custom_seed<S: AsRef<str>>(&mut self, words: &[S]) -> Result<()> {
		if words.is_empty() {
			return Err(GramError::EmptyContext);
		}
		self.start_seed = StartSeed::Custom(words.iter().map(|w| w.as_ref().to_owned()).collect());
		Ok(())
	}
}
