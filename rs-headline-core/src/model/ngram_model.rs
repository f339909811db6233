use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::distribution::Distribution;
use super::history::History;

/// Normalized word-level n-gram model.
///
/// Maps each history of `order` tokens to the distribution of tokens observed
/// right after it. The model has no mutating methods: it is produced by
/// [`CountTable::normalize`](super::counts::CountTable::normalize) and
/// replaced wholesale on retraining, so it can be shared between threads.
///
/// # Invariants
/// - `order` is always >= 1
/// - Every history present maps to a non-empty distribution
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGramModel {
	/// Number of tokens in each history.
	order: usize,

	distributions: HashMap<History, Distribution>,
}

/// One row of the diagnostic dump: a history and its ordered next tokens.
///
/// Reserved tokens are rendered as `~` (padding) and `""` (end).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
	pub history: Vec<String>,
	pub next: Vec<(String, f64)>,
}

impl NGramModel {
	pub(crate) fn new(order: usize, distributions: HashMap<History, Distribution>) -> Self {
		Self { order, distributions }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct histories.
	pub fn len(&self) -> usize {
		self.distributions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.distributions.is_empty()
	}

	/// Looks up the distribution observed after `history`.
	pub fn get(&self, history: &History) -> Option<&Distribution> {
		self.distributions.get(history)
	}

	/// The padded start history for this model's order.
	pub fn initial(&self) -> History {
		History::initial(self.order)
	}

	/// Iterates over all `(history, distribution)` pairs, in no particular order.
	pub fn histories(&self) -> impl Iterator<Item = (&History, &Distribution)> {
		self.distributions.iter()
	}

	/// Returns the whole model as plain strings, sorted by history.
	pub fn dump(&self) -> Vec<HistoryEntry> {
		let mut keys: Vec<&History> = self.distributions.keys().collect();
		keys.sort();

		keys.into_iter()
			.map(|history| HistoryEntry {
				history: history.tokens().iter().map(|t| t.as_str().to_owned()).collect(),
				next: self.distributions[history]
					.iter()
					.map(|(t, p)| (t.as_str().to_owned(), p))
					.collect(),
			})
			.collect()
	}
}
