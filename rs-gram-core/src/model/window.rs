use super::WordId;

/// Fixed-capacity ring of the most recent identifiers.
///
/// Backed by a boxed slice and a write cursor: pushing is O(1) and never
/// allocates. Once full, each push overwrites the oldest identifier.
#[derive(Clone, Debug)]
pub(crate) struct Window {
	slots: Box<[WordId]>,
	cursor: usize,
	len: usize,
}

impl Window {
	/// Creates an empty window. `capacity` must be at least 1.
	pub(crate) fn new(capacity: usize) -> Self {
		debug_assert!(capacity > 0);
		Self { slots: vec![0; capacity].into_boxed_slice(), cursor: 0, len: 0 }
	}

	pub(crate) fn push(&mut self, idx: WordId) {
		let capacity = self.slots.len();
		self.slots[self.cursor] = idx;
		self.cursor = (self.cursor + 1) % capacity;
		self.len = (self.len + 1).min(capacity);
	}

	pub(crate) fn is_full(&self) -> bool {
		self.len == self.slots.len()
	}

	/// Writes the content, oldest first, into `out` (cleared beforehand).
	pub(crate) fn write_to(&self, out: &mut Vec<WordId>) {
		let capacity = self.slots.len();
		let start = (self.cursor + capacity - self.len) % capacity;
		out.clear();
		out.extend((0..self.len).map(|k| self.slots[(start + k) % capacity]));
	}
}
