use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::vec;

use crate::error::Result;
use crate::io::open_lines;

/// Normalizes one line of text before it is split into words.
///
/// The steps run in a fixed order:
/// 1. commas are removed
/// 2. every period becomes a standalone `" ."`
/// 3. `". . ."` produced by step 2 is merged back into `"..."`
pub fn normalize_line(line: &str) -> String {
	line.replace(',', "").replace('.', " .").replace(". . .", "...")
}

/// Normalizes a line and splits it on whitespace.
pub fn split_line(line: &str) -> Vec<String> {
	normalize_line(line).split_whitespace().map(str::to_owned).collect()
}

/// Tokenizes an in-memory text with the same rules as [`tokenize`].
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
	text.lines().flat_map(split_line)
}

/// Opens `path` and returns a lazy stream over its words.
pub fn tokenize<P: AsRef<Path>>(path: P) -> Result<WordStream<BufReader<File>>> {
	Ok(WordStream { lines: open_lines(path)?, pending: Vec::new().into_iter() })
}

/// Lazy word iterator over a buffered reader.
///
/// Reads one line at a time; a read failure is yielded once as an error.
pub struct WordStream<B> {
	lines: io::Lines<B>,
	pending: vec::IntoIter<String>,
}

impl<B: BufRead> WordStream<B> {
	pub fn from_reader(reader: B) -> Self {
		Self { lines: reader.lines(), pending: Vec::new().into_iter() }
	}
}

impl<B: BufRead> Iterator for WordStream<B> {
	type Item = Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(word) = self.pending.next() {
				return Some(Ok(word));
			}
			match self.lines.next()? {
				Ok(line) => self.pending = split_line(&line).into_iter(),
				Err(e) => return Some(Err(e.into())),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn commas_are_dropped() {
		assert_eq!(split_line("red, green,blue"), vec!["red", "greenblue"]);
	}

	#[test]
	fn periods_become_tokens() {
		assert_eq!(split_line("the end. again."), vec!["the", "end", ".", "again", "."]);
	}

	#[test]
	fn ellipsis_stays_one_token() {
		assert_eq!(normalize_line("wait..."), "wait ...");
		assert_eq!(split_line("wait... what"), vec!["wait", "...", "what"]);
	}

	#[test]
	fn blank_lines_produce_nothing() {
		assert!(split_line("   ").is_empty());
		let all: Vec<String> = words("a b\n\n c\r\n").collect();
		assert_eq!(all, vec!["a", "b", "c"]);
	}

	#[test]
	fn stream_reads_across_lines() {
		let reader = io::Cursor::new("the cat\nsat.\n");
		let all: Vec<String> = WordStream::from_reader(reader).map(|w| w.unwrap()).collect();
		assert_eq!(all, vec!["the", "cat", "sat", "."]);
	}

	#[test]
	fn tokenize_missing_file_fails() {
		assert!(tokenize("/nonexistent/corpus.txt").is_err());
	}
}
