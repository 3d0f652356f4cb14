//! Top-level module for the n-gram language model.
//!
//! This module provides a word-level n-gram model, including:
//! - Word <-> identifier mapping (`Vocabulary`)
//! - Text normalization and word streams (`tokenizer`)
//! - Multi-order sliding-window counting (`CountModel`)
//! - Maximum-likelihood probabilities (`ProbabilityModel`, `NGramModel`)
//! - Greedy and softmax sequence generation (`Generator`)
//! - A facade tying everything together (`MultiGramModel`)

/// Identifier of a word in a [`vocabulary::Vocabulary`]. `0` is the empty word.
pub type WordId = u32;

/// Bidirectional word <-> identifier mapping.
///
/// Grows on demand, never shrinks.
pub mod vocabulary;

/// Line normalization and lazy word streams over text files.
pub mod tokenizer;

/// Raw n-gram counts for every order, built by sliding windows.
pub mod count_model;

/// Probability table for a single n-gram order.
pub mod ngram_model;

/// Next-word probabilities for every order, derived from counts.
pub mod probability_model;

/// Greedy and softmax next-word selection and sequence generation.
pub mod generator;

/// Parameters of a complete generation call.
///
/// Serializable, so that it can be read from a JSON file.
pub mod prediction_input;

/// Word-level facade: vocabulary, counts, probabilities and generation.
pub mod multigram_model;

/// Continuations of a single context.
///
/// Holds greedy and weighted random selection.
pub mod state;

/// Fixed-capacity ring buffer of recent identifiers.
///
/// This module is not exposed publicly.
mod window;
