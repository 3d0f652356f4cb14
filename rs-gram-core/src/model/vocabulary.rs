use std::collections::HashMap;
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::io::read_file;
use super::WordId;

/// Bidirectional mapping between words and identifiers.
///
/// Identifier `0` is reserved for the empty string. New words receive the
/// next identifier in increasing order and are never removed, so
/// `idx_to_word` is a dense vector indexed by identifier.
///
/// # Invariants
/// - `word_to_idx` and `idx_to_word` are exact inverses
/// - `idx_to_word[0] == ""`
#[derive(Clone, Debug)]
pub struct Vocabulary {
	word_to_idx: HashMap<String, WordId>,
	idx_to_word: Vec<String>,
}

impl Default for Vocabulary {
	fn default() -> Self {
		Self::new()
	}
}

impl Vocabulary {
	/// Creates a vocabulary holding only the reserved empty word.
	pub fn new() -> Self {
		let mut word_to_idx = HashMap::new();
		word_to_idx.insert(String::new(), 0);
		Self { word_to_idx, idx_to_word: vec![String::new()] }
	}

	/// Registers every line of a word-list file.
	///
	/// One word per line, line terminators are stripped. Words already known
	/// keep their identifier, so loading a list twice is a no-op.
	///
	/// Returns the number of newly registered words.
	pub fn load_word_list<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
		let before = self.len();
		for word in read_file(&path)? {
			self.id_for(&word);
		}
		let added = self.len() - before;
		debug!("word list {}: {} new words", path.as_ref().display(), added);
		Ok(added)
	}

	/// Returns the identifier of `word`, registering it first if needed.
	pub fn id_for(&mut self, word: &str) -> WordId {
		if let Some(&idx) = self.word_to_idx.get(word) {
			return idx;
		}
		let idx = self.idx_to_word.len() as WordId;
		self.word_to_idx.insert(word.to_owned(), idx);
		self.idx_to_word.push(word.to_owned());
		idx
	}

	/// Returns the identifier of `word` without ever registering it.
	pub fn lookup(&self, word: &str) -> Option<WordId> {
		self.word_to_idx.get(word).copied()
	}

	/// Returns the word behind `idx`, `None` if it was never allocated.
	pub fn word_for(&self, idx: WordId) -> Option<&str> {
		self.idx_to_word.get(idx as usize).map(String::as_str)
	}

	/// Iterates over every word, by increasing identifier.
	pub fn words(&self) -> impl Iterator<Item = &str> {
		self.idx_to_word.iter().map(String::as_str)
	}

	/// Number of known words, the reserved empty word included.
	pub fn len(&self) -> usize {
		self.idx_to_word.len()
	}

	/// Always false: the reserved empty word is present from the start.
	pub fn is_empty(&self) -> bool {
		self.idx_to_word.is_empty()
	}
}
