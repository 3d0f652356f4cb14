use std::collections::HashMap;

use log::debug;
use rand::Rng;
use rand::seq::IteratorRandom;

use crate::error::{GramError, Result};
use super::WordId;
use super::window::Window;

/// Raw n-gram occurrence counts for every order `1..=step_max + 1`.
///
/// Order index `i` maps identifier tuples of length `i + 1` to the number of
/// times that exact contiguous sequence was read.
///
/// # Invariants
/// - `counts.len() == step_max + 1`
/// - Every stored count is >= 1: queries never insert entries
#[derive(Clone, Debug)]
pub struct CountModel {
	step_max: usize,
	counts: Vec<HashMap<Vec<WordId>, u64>>,
	total_tokens: u64,
	passes: usize,
}

impl CountModel {
	/// Creates an empty model tracking n-grams up to length `step_max + 1`.
	pub fn new(step_max: usize) -> Self {
		Self {
			step_max,
			counts: vec![HashMap::new(); step_max + 1],
			total_tokens: 0,
			passes: 0,
		}
	}

	pub fn step_max(&self) -> usize {
		self.step_max
	}

	/// Tokens read over all passes.
	pub fn total_tokens(&self) -> u64 {
		self.total_tokens
	}

	/// Number of counting passes run so far.
	pub fn passes(&self) -> usize {
		self.passes
	}

	/// Starts a counting pass.
	///
	/// Each pass has its own windows, so n-grams never span two passes.
	pub fn pass(&mut self) -> CountPass<'_> {
		self.passes += 1;
		let windows = (0..=self.step_max).map(|i| Window::new(i + 1)).collect();
		CountPass {
			model: self,
			windows,
			seen: 0,
			scratch: Vec::new(),
		}
	}

	/// Counts an identifier stream in a single pass.
	///
	/// Returns the number of identifiers read.
	pub fn ingest_ids<I: IntoIterator<Item = WordId>>(&mut self, ids: I) -> usize {
		let mut pass = self.pass();
		for idx in ids {
			pass.push(idx);
		}
		pass.seen()
	}

	/// Returns how many times `ngram` was observed, 0 if never.
	///
	/// The count table is left untouched: an unknown n-gram is not inserted.
	///
	/// # Errors
	/// `LengthExceeded` if `ngram` is longer than `step_max + 1`.
	pub fn count(&self, ngram: &[WordId]) -> Result<u64> {
		if ngram.len() > self.step_max + 1 {
			return Err(GramError::LengthExceeded { len: ngram.len(), max: self.step_max + 1 });
		}
		if ngram.is_empty() {
			return Ok(0);
		}
		Ok(self.counts[ngram.len() - 1].get(ngram).copied().unwrap_or(0))
	}

	pub(crate) fn tables(&self) -> &[HashMap<Vec<WordId>, u64>] {
		&self.counts
	}

	/// Returns a copy where every identifier `id` is replaced by `mapping[id]`.
	///
	/// Identifiers outside of `mapping` are kept as they are.
	pub(crate) fn remapped(&self, mapping: &[WordId]) -> Self {
		let translate = |idx: &WordId| mapping.get(*idx as usize).copied().unwrap_or(*idx);
		let counts = self
			.counts
			.iter()
			.map(|table| {
				let mut out: HashMap<Vec<WordId>, u64> = HashMap::with_capacity(table.len());
				for (ngram, count) in table {
					*out.entry(ngram.iter().map(translate).collect()).or_insert(0) += count;
				}
				out
			})
			.collect();
		Self {
			step_max: self.step_max,
			counts,
			total_tokens: self.total_tokens,
			passes: self.passes,
		}
	}

	#[cfg(test)]
	pub(crate) fn set_count(&mut self, ngram: &[WordId], count: u64) {
		self.counts[ngram.len() - 1].insert(ngram.to_vec(), count);
	}

	/// Returns the table of order index `order`, if tracked.
	pub fn order(&self, order: usize) -> Option<&HashMap<Vec<WordId>, u64>> {
		self.counts.get(order)
	}

	/// Number of distinct n-grams stored at order index `order`.
	pub fn len(&self, order: usize) -> usize {
		self.counts.get(order).map_or(0, HashMap::len)
	}

	pub fn is_empty(&self) -> bool {
		self.counts.iter().all(HashMap::is_empty)
	}

	/// Picks a random observed n-gram of length `len`.
	///
	/// Useful as a generation seed. Returns `None` if `len` is 0, too long,
	/// or if nothing of that length was counted.
	///
	/// # Notes
	/// - Candidates are drawn from a sorted snapshot, so the same `rng`
	///   state always picks the same n-gram whatever the hash map order.
	pub fn random_ngram<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Option<Vec<WordId>> {
		if len == 0 {
			return None;
		}
		let mut ngrams: Vec<&Vec<WordId>> = self.counts.get(len - 1)?.keys().collect();
		ngrams.sort_unstable();
		ngrams.into_iter().choose(rng).cloned()
	}

	/// Adds every count of `other` into this model.
	///
	/// Both models must have been built against the same vocabulary,
	/// identifiers are not translated.
	///
	/// # Errors
	/// `OrderMismatch` if the two models track different orders.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.step_max != other.step_max {
			return Err(GramError::OrderMismatch { left: self.step_max, right: other.step_max });
		}

		for (table, other_table) in self.counts.iter_mut().zip(&other.counts) {
			for (ngram, count) in other_table {
				*table.entry(ngram.clone()).or_insert(0) += count;
			}
		}
		self.total_tokens += other.total_tokens;
		self.passes += other.passes;

		Ok(())
	}
}

/// One sliding-window counting pass over an identifier stream.
///
/// Holds one ring of length `i + 1` per order index `i`. An n-gram of order
/// index `i` is counted as soon as its ring is full, i.e. once the pass has
/// read at least `i + 1` identifiers.
pub struct CountPass<'a> {
	model: &'a mut CountModel,
	windows: Vec<Window>,
	seen: usize,
	scratch: Vec<WordId>,
}

impl CountPass<'_> {
	/// Feeds the next identifier of the stream.
	pub fn push(&mut self, idx: WordId) {
		self.seen += 1;
		self.model.total_tokens += 1;

		for (order, window) in self.windows.iter_mut().enumerate() {
			window.push(idx);
			if !window.is_full() {
				continue;
			}
			window.write_to(&mut self.scratch);
			let table = &mut self.model.counts[order];
			match table.get_mut(self.scratch.as_slice()) {
				Some(count) => *count += 1,
				None => {
					table.insert(self.scratch.clone(), 1);
				}
			}
		}
	}

	/// Identifiers read by this pass so far.
	pub fn seen(&self) -> usize {
		self.seen
	}
}

impl Drop for CountPass<'_> {
	fn drop(&mut self) {
		debug!(
			"counting pass done: {} tokens, {} distinct n-grams",
			self.seen,
			self.model.counts.iter().map(HashMap::len).sum::<usize>()
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	// the=1 cat=2 sat=3
	const CYCLE: [WordId; 9] = [1, 2, 3, 1, 2, 3, 1, 2, 3];

	#[test]
	fn counts_every_order() {
		let mut model = CountModel::new(2);
		assert_eq!(model.ingest_ids(CYCLE), 9);

		assert_eq!(model.count(&[1]).unwrap(), 3);
		assert_eq!(model.count(&[2]).unwrap(), 3);
		assert_eq!(model.count(&[3]).unwrap(), 3);
		assert_eq!(model.count(&[1, 2]).unwrap(), 3);
		assert_eq!(model.count(&[2, 3]).unwrap(), 3);
		assert_eq!(model.count(&[3, 1]).unwrap(), 2);
		assert_eq!(model.count(&[1, 2, 3]).unwrap(), 3);
		assert_eq!(model.count(&[3, 1, 2]).unwrap(), 2);
		assert_eq!(model.len(1), 3);
	}

	#[test]
	fn short_stream_fills_low_orders_only() {
		let mut model = CountModel::new(3);
		model.ingest_ids([5, 6]);
		assert_eq!(model.len(0), 2);
		assert_eq!(model.len(1), 1);
		assert_eq!(model.len(2), 0);
		assert_eq!(model.len(3), 0);
	}

	#[test]
	fn unknown_ngram_is_zero_and_not_inserted() {
		let mut model = CountModel::new(2);
		model.ingest_ids(CYCLE);
		let before = model.len(1);
		assert_eq!(model.count(&[3, 3]).unwrap(), 0);
		assert_eq!(model.len(1), before);
		assert_eq!(model.count(&[]).unwrap(), 0);
	}

	#[test]
	fn too_long_query_is_rejected() {
		let model = CountModel::new(1);
		assert!(matches!(
			model.count(&[1, 2, 3]),
			Err(GramError::LengthExceeded { len: 3, max: 2 })
		));
	}

	#[test]
	fn passes_accumulate_without_spanning() {
		let mut model = CountModel::new(1);
		model.ingest_ids([1, 2]);
		model.ingest_ids([3, 4]);
		assert_eq!(model.count(&[2, 3]).unwrap(), 0);
		assert_eq!(model.passes(), 2);
		assert_eq!(model.total_tokens(), 4);

		model.ingest_ids([1, 2]);
		assert_eq!(model.count(&[1, 2]).unwrap(), 2);
	}

	#[test]
	fn second_pass_doubles_counts() {
		let mut once = CountModel::new(3);
		once.ingest_ids(CYCLE);
		let mut twice = CountModel::new(3);
		twice.ingest_ids(CYCLE);
		twice.ingest_ids(CYCLE);

		for order in 0..=3 {
			for (ngram, count) in once.order(order).unwrap() {
				assert_eq!(twice.count(ngram).unwrap(), 2 * count);
			}
			assert_eq!(once.len(order), twice.len(order));
		}
	}

	#[test]
	fn merge_sums_counts() {
		let mut left = CountModel::new(1);
		left.ingest_ids([1, 2, 1]);
		let mut right = CountModel::new(1);
		right.ingest_ids([1, 2, 3]);

		left.merge(&right).unwrap();
		assert_eq!(left.count(&[1]).unwrap(), 3);
		assert_eq!(left.count(&[1, 2]).unwrap(), 2);
		assert_eq!(left.count(&[2, 3]).unwrap(), 1);
		assert_eq!(left.total_tokens(), 6);
	}

	#[test]
	fn merge_rejects_other_orders() {
		let mut left = CountModel::new(1);
		let right = CountModel::new(2);
		assert!(matches!(left.merge(&right), Err(GramError::OrderMismatch { left: 1, right: 2 })));
	}

	#[test]
	fn random_ngram_is_observed() {
		let mut model = CountModel::new(2);
		model.ingest_ids(CYCLE);
		let mut rng = StdRng::seed_from_u64(7);

		let seed = model.random_ngram(2, &mut rng).unwrap();
		assert!(model.count(&seed).unwrap() > 0);
		assert!(model.random_ngram(0, &mut rng).is_none());
		assert!(model.random_ngram(4, &mut rng).is_none());
	}

	#[test]
	fn random_ngram_follows_rng_seed() {
		let ids: Vec<WordId> = (1..=26).collect();
		let picks: Vec<Vec<WordId>> = (0..10)
			.map(|_| {
				let mut model = CountModel::new(2);
				model.ingest_ids(ids.iter().copied());
				model.random_ngram(2, &mut StdRng::seed_from_u64(42)).unwrap()
			})
			.collect();
		assert!(picks.windows(2).all(|w| w[0] == w[1]), "{picks:?}");
	}
}
