//! N-gram-based headline generation library.
//!
//! This crate provides a word-level n-gram generation system including:
//! - Headline cleaning, de-duplication and tokenization
//! - Fixed-order history windows padded with a start symbol
//! - Count accumulation (sequential, threaded or incremental) and normalization
//! - Probabilistic generation driven by a caller-supplied random source
//! - Pluggable validation of generated candidates
//!
//! The normalized model is immutable: retraining always produces a new
//! [`NGramModel`](model::ngram_model::NGramModel).

/// Core n-gram models, training and generation logic.
pub mod model;

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// I/O utilities (flat corpus files, path helpers).
pub mod io;

pub use error::{ModelError, Result};
