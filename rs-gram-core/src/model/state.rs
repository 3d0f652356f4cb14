use rand::Rng;

use super::WordId;

/// Every observed continuation of one context, with its probability.
///
/// Conceptually a node of a Markov chain whose outgoing edges are weighted
/// by the probability of the full n-gram.
///
/// ## Invariants
/// - After [`State::seal`], transitions are sorted by identifier
/// - A state only exists with at least one transition
#[derive(Clone, Debug, Default)]
pub struct State {
	transitions: Vec<(WordId, f64)>,
}

impl State {
	pub(crate) fn add_transition(&mut self, next: WordId, probability: f64) {
		self.transitions.push((next, probability));
	}

	/// Sorts the transitions so that selection does not depend on hash order.
	pub(crate) fn seal(&mut self) {
		self.transitions.sort_unstable_by_key(|&(next, _)| next);
	}

	/// Observed continuations, by increasing identifier.
	pub fn transitions(&self) -> &[(WordId, f64)] {
		&self.transitions
	}

	/// Returns the most probable continuation.
	///
	/// Ties go to the lowest identifier.
	pub fn best(&self) -> Option<WordId> {
		let mut best: Option<(WordId, f64)> = None;
		for &(next, probability) in &self.transitions {
			match best {
				Some((_, max)) if probability <= max => {}
				_ => best = Some((next, probability)),
			}
		}
		best.map(|(next, _)| next)
	}

	/// Samples a continuation with weights `exp(probability)`.
	///
	/// The exponential is applied to probabilities that are already
	/// normalized, so the draw is flatter than sampling the probabilities
	/// themselves.
	///
	/// This method performs:
	/// - an O(n) pass to sum the weights
	/// - a cumulative subtraction to select a bucket
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<WordId> {
		let total: f64 = self.transitions.iter().map(|&(_, p)| p.exp()).sum();
		if self.transitions.is_empty() || total <= 0.0 {
			return None;
		}

		let mut r = rng.random::<f64>() * total;

		let mut fallback: Option<WordId> = None;
		for &(next, probability) in &self.transitions {
			let weight = probability.exp();
			if r < weight {
				return Some(next);
			}
			r -= weight;
			fallback = Some(next);
		}

		// Rounding can leave a tiny remainder past the last bucket.
		fallback
	}
}
