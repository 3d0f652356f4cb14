use log::debug;

use crate::error::{GramError, Result};
use super::WordId;
use super::count_model::CountModel;
use super::ngram_model::NGramModel;
use super::state::State;

/// Next-word probabilities derived from a [`CountModel`].
///
/// `orders[i]` holds n-grams of length `i + 1`. Order index 0 stays empty:
/// there is no context to condition a single word on.
///
/// Probabilities are maximum-likelihood estimates:
/// - order index 1: `count(a, b) / Σ count(bigrams)`, a distribution over
///   every bigram rather than one per context
/// - order index `i >= 2`: `count(w1..wn) / count(w1..wn-1)`
///
/// The table is a snapshot: it must be computed again after new counts.
#[derive(Clone, Debug)]
pub struct ProbabilityModel {
	step_max: usize,
	orders: Vec<NGramModel>,
}

impl ProbabilityModel {
	/// Creates a model with no probabilities, every prediction fails.
	pub fn empty(step_max: usize) -> Self {
		Self { step_max, orders: (0..=step_max).map(|i| NGramModel::new(i + 1)).collect() }
	}

	/// Derives every probability table from `counts`.
	///
	/// # Errors
	/// `MissingPrefix` if an n-gram is counted while its prefix is not.
	/// Counting passes always count both, this only happens with tables
	/// that were assembled by hand.
	pub fn compute(counts: &CountModel) -> Result<Self> {
		let mut model = Self::empty(counts.step_max());
		let tables = counts.tables();

		if let (Some(bigrams), Some(target)) = (tables.get(1), model.orders.get_mut(1)) {
			let total: u64 = bigrams.values().sum();
			for (ngram, count) in bigrams {
				target.insert(ngram, *count as f64 / total as f64);
			}
		}

		for i in 2..tables.len() {
			let (lower, table) = (&tables[i - 1], &tables[i]);
			let target = &mut model.orders[i];
			for (ngram, count) in table {
				let prefix = &ngram[..ngram.len() - 1];
				let prefix_count = match lower.get(prefix) {
					Some(&c) if c > 0 => c,
					_ => return Err(GramError::MissingPrefix { order: i - 1, ngram: ngram.clone() }),
				};
				target.insert(ngram, *count as f64 / prefix_count as f64);
			}
		}

		for order in &mut model.orders {
			order.seal();
		}

		debug!(
			"probabilities computed: {:?} n-grams per order",
			model.orders.iter().map(NGramModel::len).collect::<Vec<_>>()
		);
		Ok(model)
	}

	pub fn step_max(&self) -> usize {
		self.step_max
	}

	/// Table of order index `order`, if tracked.
	pub fn order(&self, order: usize) -> Option<&NGramModel> {
		self.orders.get(order)
	}

	/// Probability of `ngram`, 0.0 if it was never observed.
	///
	/// # Errors
	/// `LengthExceeded` if `ngram` is longer than `step_max + 1`.
	pub fn probability(&self, ngram: &[WordId]) -> Result<f64> {
		if ngram.len() > self.step_max + 1 {
			return Err(GramError::LengthExceeded { len: ngram.len(), max: self.step_max + 1 });
		}
		Ok(ngram
			.len()
			.checked_sub(1)
			.and_then(|i| self.orders[i].probability(ngram))
			.unwrap_or(0.0))
	}

	/// Continuations of `context`, looked up at order index `context.len()`.
	///
	/// # Errors
	/// - `EmptyContext` if `context` is empty
	/// - `LengthExceeded` if `context` is longer than `step_max`
	/// - `NoCandidates` if nothing was observed after `context`
	pub fn state(&self, context: &[WordId]) -> Result<&State> {
		if context.is_empty() {
			return Err(GramError::EmptyContext);
		}
		if context.len() > self.step_max {
			return Err(GramError::LengthExceeded { len: context.len(), max: self.step_max });
		}
		self.orders[context.len()]
			.state(context)
			.ok_or_else(|| GramError::NoCandidates { context: context.to_vec() })
	}
}
