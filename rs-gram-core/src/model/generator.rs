use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GramError, Result};
use super::WordId;
use super::probability_model::ProbabilityModel;
use super::window::Window;

/// How the next word is chosen among the observed continuations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
	/// Most probable continuation, lowest identifier on ties.
	#[default]
	Greedy,
	/// Random continuation weighted by `exp(probability)`.
	Softmax,
}

/// Sequence generator over a computed [`ProbabilityModel`].
///
/// # Responsibilities
/// - Predict one continuation for a context, greedily or by sampling
/// - Generate `n` identifiers from a seed, sliding a context window of at
///   most `step_max` identifiers
///
/// The generator only borrows the model, any number of them can run on the
/// same model. Each call owns its window; nothing is kept between calls.
#[derive(Clone, Copy, Debug)]
pub struct Generator<'m> {
	model: &'m ProbabilityModel,
}

impl<'m> Generator<'m> {
	pub fn new(model: &'m ProbabilityModel) -> Self {
		Self { model }
	}

	/// Returns the most probable continuation of `context`.
	///
	/// The table of order index `context.len()` is used. Among equally
	/// probable continuations the lowest identifier wins.
	///
	/// # Errors
	/// `EmptyContext`, `LengthExceeded` or `NoCandidates`.
	pub fn predict_next(&self, context: &[WordId]) -> Result<WordId> {
		let state = self.model.state(context)?;
		let next = state
			.best()
			.ok_or_else(|| GramError::NoCandidates { context: context.to_vec() })?;
		trace!("greedy {:?} -> {}", context, next);
		Ok(next)
	}

	/// Samples a continuation of `context` using the thread-local RNG.
	pub fn predict_next_random(&self, context: &[WordId]) -> Result<WordId> {
		self.predict_next_random_with(context, &mut rand::rng())
	}

	/// Samples a continuation of `context`.
	///
	/// Each candidate is weighted by `exp(probability)`, weights are then
	/// normalized by their sum.
	pub fn predict_next_random_with<R: Rng + ?Sized>(&self, context: &[WordId], rng: &mut R) -> Result<WordId> {
		let state = self.model.state(context)?;
		let next = state
			.sample(rng)
			.ok_or_else(|| GramError::NoCandidates { context: context.to_vec() })?;
		trace!("softmax {:?} -> {}", context, next);
		Ok(next)
	}

	/// Generates `n` identifiers after `seed` with greedy selection.
	///
	/// Deterministic for a given model.
	pub fn generate_n(&self, seed: &[WordId], n: usize) -> Result<Vec<WordId>> {
		self.generate(seed, n, |context| self.predict_next(context))
	}

	/// Generates `n` identifiers after `seed` by sampling.
	pub fn generate_n_random(&self, seed: &[WordId], n: usize) -> Result<Vec<WordId>> {
		self.generate_n_random_with(seed, n, &mut rand::rng())
	}

	pub fn generate_n_random_with<R: Rng + ?Sized>(
		&self,
		seed: &[WordId],
		n: usize,
		rng: &mut R,
	) -> Result<Vec<WordId>> {
		self.generate(seed, n, |context| self.predict_next_random_with(context, &mut *rng))
	}

	/// Generates `n` identifiers with the given strategy.
	pub fn generate_with<R: Rng + ?Sized>(
		&self,
		strategy: Strategy,
		seed: &[WordId],
		n: usize,
		rng: &mut R,
	) -> Result<Vec<WordId>> {
		match strategy {
			Strategy::Greedy => self.generate_n(seed, n),
			Strategy::Softmax => self.generate_n_random_with(seed, n, rng),
		}
	}

	/// Shared generation loop.
	///
	/// The window starts with the whole seed and grows up to `step_max`,
	/// after which every new identifier evicts the oldest one. The seed is
	/// validated up front so that no result is produced for a bad seed,
	/// even with `n == 0`.
	fn generate<F>(&self, seed: &[WordId], n: usize, mut select: F) -> Result<Vec<WordId>>
	where
		F: FnMut(&[WordId]) -> Result<WordId>,
	{
		let step_max = self.model.step_max();
		if seed.is_empty() {
			return Err(GramError::EmptyContext);
		}
		if seed.len() > step_max {
			return Err(GramError::LengthExceeded { len: seed.len(), max: step_max });
		}

		let mut window = Window::new(step_max);
		for &idx in seed {
			window.push(idx);
		}

		let mut context = Vec::with_capacity(step_max);
		let mut nexts = Vec::with_capacity(n);
		for _ in 0..n {
			window.write_to(&mut context);
			let next = select(context.as_slice())?;
			window.push(next);
			nexts.push(next);
		}

		Ok(nexts)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::count_model::CountModel;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	// the=1 cat=2 sat=3
	const CYCLE: [WordId; 9] = [1, 2, 3, 1, 2, 3, 1, 2, 3];

	fn model(step_max: usize, ids: &[WordId]) -> ProbabilityModel {
		let mut counts = CountModel::new(step_max);
		counts.ingest_ids(ids.iter().copied());
		ProbabilityModel::compute(&counts).unwrap()
	}

	#[test]
	fn greedy_follows_the_cycle() {
		let model = model(4, &CYCLE);
		let generator = Generator::new(&model);
		assert_eq!(generator.predict_next(&[1]).unwrap(), 2);
		assert_eq!(generator.generate_n(&[1], 4).unwrap(), vec![2, 3, 1, 2]);
	}

	#[test]
	fn greedy_picks_the_most_probable() {
		// after 1: 2 twice, 3 once
		let model = model(1, &[1, 2, 1, 2, 1, 3]);
		let generator = Generator::new(&model);
		assert_eq!(generator.predict_next(&[1]).unwrap(), 2);
	}

	#[test]
	fn greedy_ties_go_to_lowest_id() {
		let model = model(1, &[1, 5, 1, 4]);
		let generator = Generator::new(&model);
		assert_eq!(generator.predict_next(&[1]).unwrap(), 4);
	}

	#[test]
	fn window_slides_at_step_max() {
		// with step_max = 1 only the last word matters
		let model = model(1, &CYCLE);
		let generator = Generator::new(&model);
		assert_eq!(generator.generate_n(&[3], 5).unwrap(), vec![1, 2, 3, 1, 2]);
	}

	#[test]
	fn too_long_seed_is_rejected() {
		let model = model(2, &CYCLE);
		let generator = Generator::new(&model);
		assert!(matches!(
			generator.predict_next(&[1, 2, 3]),
			Err(GramError::LengthExceeded { len: 3, max: 2 })
		));
		assert!(matches!(
			generator.generate_n(&[1, 2, 3], 0),
			Err(GramError::LengthExceeded { .. })
		));
		assert!(matches!(
			generator.generate_n_random(&[1, 2, 3], 2),
			Err(GramError::LengthExceeded { .. })
		));
	}

	#[test]
	fn empty_seed_is_rejected() {
		let model = model(2, &CYCLE);
		let generator = Generator::new(&model);
		assert!(matches!(generator.generate_n(&[], 3), Err(GramError::EmptyContext)));
	}

	#[test]
	fn dead_end_is_an_error() {
		// 9 only appears last, nothing follows it
		let model = model(1, &[1, 2, 9]);
		let generator = Generator::new(&model);
		assert!(matches!(generator.predict_next(&[9]), Err(GramError::NoCandidates { .. })));
		assert!(matches!(generator.generate_n(&[1], 3), Err(GramError::NoCandidates { .. })));
		assert!(matches!(
			generator.predict_next_random(&[9]),
			Err(GramError::NoCandidates { .. })
		));
	}

	#[test]
	fn random_generation_only_uses_observed_continuations() {
		let model = model(2, &[1, 2, 1, 3, 1, 2, 1, 3, 1]);
		let generator = Generator::new(&model);
		let mut rng = StdRng::seed_from_u64(11);

		let words = generator.generate_n_random_with(&[1], 6, &mut rng).unwrap();
		assert_eq!(words.len(), 6);
		// every other word is 1, the others are 2 or 3
		for (i, w) in words.iter().enumerate() {
			if i % 2 == 1 {
				assert_eq!(*w, 1);
			} else {
				assert!(*w == 2 || *w == 3);
			}
		}
	}

	#[test]
	fn seeded_rng_is_reproducible() {
		let model = model(2, &[1, 2, 1, 3, 1, 2, 1, 3, 1]);
		let generator = Generator::new(&model);

		let first = generator
			.generate_with(Strategy::Softmax, &[1], 8, &mut StdRng::seed_from_u64(5))
			.unwrap();
		let second = generator
			.generate_with(Strategy::Softmax, &[1], 8, &mut StdRng::seed_from_u64(5))
			.unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn zero_words_is_empty() {
		let model = model(2, &CYCLE);
		let generator = Generator::new(&model);
		assert!(generator.generate_n(&[1], 0).unwrap().is_empty());
	}
}
