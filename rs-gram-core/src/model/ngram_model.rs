use std::collections::HashMap;

use super::WordId;
use super::state::State;

/// Probability table for a single n-gram order.
///
/// Stores the probability of every full n-gram and, for fast prediction,
/// the same probabilities grouped by context (the first `n - 1` identifiers).
///
/// # Invariants
/// - Every key of `probabilities` has length `n`
/// - Every key of `states` has length `n - 1`
#[derive(Clone, Debug)]
pub struct NGramModel {
	/// Length of the stored n-grams.
	n: usize,

	/// Full n-gram -> probability.
	probabilities: HashMap<Vec<WordId>, f64>,

	/// Context -> observed continuations.
	states: HashMap<Vec<WordId>, State>,
}

impl NGramModel {
	pub(crate) fn new(n: usize) -> Self {
		Self { n, probabilities: HashMap::new(), states: HashMap::new() }
	}

	/// Records the probability of `ngram` (of length `n`).
	pub(crate) fn insert(&mut self, ngram: &[WordId], probability: f64) {
		debug_assert_eq!(ngram.len(), self.n);
		let (next, context) = match ngram.split_last() {
			Some((next, context)) => (*next, context),
			None => return,
		};
		self.probabilities.insert(ngram.to_vec(), probability);
		self.states.entry(context.to_vec()).or_default().add_transition(next, probability);
	}

	pub(crate) fn seal(&mut self) {
		for state in self.states.values_mut() {
			state.seal();
		}
	}

	/// Length of the n-grams held by this table.
	pub fn n(&self) -> usize {
		self.n
	}

	/// Probability of a full n-gram, `None` if it was never observed.
	pub fn probability(&self, ngram: &[WordId]) -> Option<f64> {
		self.probabilities.get(ngram).copied()
	}

	/// Continuations observed after `context`.
	pub fn state(&self, context: &[WordId]) -> Option<&State> {
		self.states.get(context)
	}

	/// Iterates over `(n-gram, probability)` pairs in arbitrary order.
	pub fn iter(&self) -> impl Iterator<Item = (&[WordId], f64)> {
		self.probabilities.iter().map(|(k, v)| (k.as_slice(), *v))
	}

	/// Iterates over every observed context.
	pub fn contexts(&self) -> impl Iterator<Item = (&[WordId], &State)> {
		self.states.iter().map(|(k, v)| (k.as_slice(), v))
	}

	pub fn len(&self) -> usize {
		self.probabilities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.probabilities.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn groups_ngrams_by_context() {
		let mut model = NGramModel::new(3);
		model.insert(&[1, 2, 3], 0.75);
		model.insert(&[1, 2, 1], 0.25);
		model.insert(&[2, 3, 1], 1.0);
		model.seal();

		assert_eq!(model.len(), 3);
		assert_eq!(model.probability(&[1, 2, 1]), Some(0.25));
		assert_eq!(model.probability(&[3, 3, 3]), None);

		let state = model.state(&[1, 2]).unwrap();
		assert_eq!(state.transitions(), &[(1, 0.25), (3, 0.75)]);
		assert!(model.state(&[9, 9]).is_none());
		assert_eq!(model.contexts().count(), 2);
	}
}
