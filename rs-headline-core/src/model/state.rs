use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use super::distribution::Distribution;
use super::history::History;
use super::token::Token;

/// Raw transition counts observed after one history.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations. States only live inside a
/// [`CountTable`](super::counts::CountTable); they are frozen into a
/// [`Distribution`] by normalization.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct State {
	/// History this state was observed after.
	key: History,
	/// Outgoing transitions indexed by the next token.
	/// Example: { "man" => 42, END => 3 }
	transitions: HashMap<Token, usize>,
}

impl State {
	/// Creates a new empty state for the given history.
	pub fn new(key: History) -> Self {
		Self {
			key,
			transitions: HashMap::new(),
		}
	}

	pub fn key(&self) -> &History {
		&self.key
	}

	/// Records an occurrence of a transition toward `next`.
	pub fn add_transition(&mut self, next: Token) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Number of occurrences recorded for `next`.
	pub fn count(&self, next: &Token) -> usize {
		self.transitions.get(next).copied().unwrap_or(0)
	}

	/// Total number of transitions recorded from this state.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same history. Transition occurrence
	/// counts are summed, which makes merging associative and commutative.
	///
	/// # Errors
	/// Returns [`ModelError::HistoryMismatch`] if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.key != other.key {
			return Err(ModelError::HistoryMismatch {
				expected: self.key.to_string(),
				found: other.key.to_string(),
			});
		}

		for (next, occurrence) in &other.transitions {
			*self.transitions.entry(next.clone()).or_insert(0) += *occurrence;
		}

		Ok(())
	}

	/// Converts the counts into an ordered probability distribution.
	pub fn normalize(&self) -> Distribution {
		Distribution::from_counts(self.transitions.iter().map(|(t, c)| (t.clone(), *c)))
	}
}
