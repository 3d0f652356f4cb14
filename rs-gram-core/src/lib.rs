//! Word-level n-gram language model.
//!
//! This crate learns word sequence frequencies from plain text and
//! generates new text from them:
//! - Counting of every n-gram order up to a configurable maximum
//! - Maximum-likelihood next-word probabilities
//! - Greedy (most likely) or softmax (sampled) generation
//!
//! Most users only need [`model::multigram_model::MultiGramModel`].

/// Core n-gram models and generation logic.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// I/O utilities (file loading, folder listing).
pub mod io;

pub use error::{GramError, Result};
pub use model::WordId;
pub use model::multigram_model::MultiGramModel;
