use std::io;

use crate::model::WordId;

/// Errors reported by the n-gram model.
///
/// Counting never fails on its own: unseen words are registered on the fly.
/// Errors surface at the edges (file access, queries and generation).
#[derive(Debug, thiserror::Error)]
pub enum GramError {
	/// A query or generation context is longer than the model supports.
	#[error("context of length {len} exceeds the maximum of {max}")]
	LengthExceeded { len: usize, max: usize },

	/// Prediction was asked for with no context at all.
	#[error("prediction context is empty")]
	EmptyContext,

	/// No n-gram in the table continues the given context.
	#[error("no continuation observed for context {context:?}")]
	NoCandidates { context: Vec<WordId> },

	/// A seed word is not part of the vocabulary.
	#[error("unknown word: {0:?}")]
	UnknownWord(String),

	/// An identifier was never allocated by the vocabulary.
	#[error("unresolved identifier: {0}")]
	UnresolvedIdentifier(WordId),

	/// A counted n-gram has no counted prefix one order below.
	#[error("n-gram {ngram:?} has no counted prefix at order index {order}")]
	MissingPrefix { order: usize, ngram: Vec<WordId> },

	/// Two models with different maximum orders were combined.
	#[error("step_max mismatch: {left} != {right}")]
	OrderMismatch { left: usize, right: usize },

	/// A parameter is outside of its accepted range.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("IO error: {0}")]
	Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GramError>;
