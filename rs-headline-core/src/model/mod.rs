//! Top-level module for the headline generation system.
//!
//! Training flows leaves first:
//! - Tokens and history windows (`Token`, `History`)
//! - Raw count accumulation (`State`, `CountTable`)
//! - The frozen, normalized model (`Distribution`, `NGramModel`)
//! - Training drivers (`Trainer`, `TrainingSession`)
//! - Sampling and acceptance (`Generator`, `Validator`)

/// Tokenizer and reserved symbols.
pub mod token;

/// Fixed-size window of the last `n` tokens.
pub mod history;

/// Raw transition counts for a single history.
///
/// Supports merging for threaded and incremental training.
pub mod state;

/// Mutable count accumulator, normalized into an `NGramModel`.
pub mod counts;

/// Ordered next-token probabilities and weighted sampling.
pub mod distribution;

/// Frozen word-level n-gram model.
pub mod ngram_model;

/// Cleaned, de-duplicated headline corpus.
pub mod corpus;

/// Training and generation parameters.
pub mod config;

/// Sequential, threaded and incremental training.
pub mod trainer;

/// Random walks over a trained model.
pub mod generator;

/// Acceptance policies for generated candidates.
pub mod validator;
