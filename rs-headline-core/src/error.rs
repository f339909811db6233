use std::io;

use thiserror::Error;

/// Errors reported by training, merging and corpus loading.
///
/// Generation never fails: an unseen history or a step cap is reported
/// through [`Termination`](crate::model::generator::Termination) instead.
#[derive(Debug, Error)]
pub enum ModelError {
	/// Training was invoked on a corpus without any headline.
	#[error("cannot train on an empty corpus")]
	EmptyCorpus,

	/// The model order must be a positive integer.
	#[error("invalid model order {order}, must be >= 1")]
	InvalidOrder { order: usize },

	/// Two count tables (or histories) built with different orders were combined.
	#[error("order mismatch: expected {expected}, found {found}")]
	OrderMismatch { expected: usize, found: usize },

	/// Two states describing different histories were merged.
	#[error("history mismatch: {expected} vs {found}")]
	HistoryMismatch { expected: String, found: String },

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("IO error: {0}")]
	Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
