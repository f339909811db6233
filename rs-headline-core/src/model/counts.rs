use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use super::history::History;
use super::ngram_model::NGramModel;
use super::state::State;
use super::token::{tokenize, Token};

/// Mutable accumulator of raw n-gram counts.
///
/// A `CountTable` is the scratch side of training: headlines are added one
/// by one, partial tables may be merged, and [`normalize`](CountTable::normalize)
/// freezes the result into an [`NGramModel`].
///
/// # Invariants
/// - `order` is always >= 1
/// - Each state in `states` is keyed by a history of length `order`
/// - All state transitions have occurrence counts >= 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CountTable {
	order: usize,
	states: HashMap<History, State>,
	headlines: usize,
}

impl CountTable {
	/// Creates an empty table of order `order`.
	///
	/// # Errors
	/// Returns [`ModelError::InvalidOrder`] if `order` is zero.
	pub fn new(order: usize) -> Result<Self> {
		if order == 0 {
			return Err(ModelError::InvalidOrder { order });
		}
		Ok(Self { order, states: HashMap::new(), headlines: 0 })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of headlines counted so far (including merged tables).
	pub fn headlines(&self) -> usize {
		self.headlines
	}

	/// Number of distinct histories observed.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn state(&self, history: &History) -> Option<&State> {
		self.states.get(history)
	}

	/// Adds one headline to the table.
	///
	/// Walks a history window from the padded start, counting each word under
	/// the history that precedes it, then counts [`Token::End`] under the
	/// history that follows the last word.
	pub fn add_headline(&mut self, headline: &str) {
		self.add_tokens(tokenize(headline));
	}

	/// Same as [`add_headline`](CountTable::add_headline) for pre-tokenized input.
	pub fn add_tokens(&mut self, tokens: Vec<Token>) {
		let mut history = History::initial(self.order);
		for token in tokens {
			self.record(&history, token.clone());
			history = history.advance(token);
		}
		self.record(&history, Token::End);
		self.headlines += 1;
	}

	fn record(&mut self, history: &History, next: Token) {
		self.states
			.entry(history.clone())
			.or_insert_with(|| State::new(history.clone()))
			.add_transition(next);
	}

	/// Merges another table into this one.
	///
	/// Occurrence counts for matching states and transitions are summed, so
	/// the merge order never changes the result.
	///
	/// # Errors
	/// Returns [`ModelError::OrderMismatch`] if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(ModelError::OrderMismatch { expected: self.order, found: other.order });
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}
		self.headlines += other.headlines;

		Ok(())
	}

	/// Freezes the counts into a normalized model.
	///
	/// # Errors
	/// Returns [`ModelError::EmptyCorpus`] if no headline was counted.
	pub fn normalize(&self) -> Result<NGramModel> {
		if self.headlines == 0 {
			return Err(ModelError::EmptyCorpus);
		}

		let distributions = self
			.states
			.iter()
			.map(|(history, state)| (history.clone(), state.normalize()))
			.collect();

		Ok(NGramModel::new(self.order, distributions))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn word(w: &str) -> Token {
		Token::Word(w.to_owned())
	}

	#[test]
	fn zero_order_is_rejected() {
		assert!(matches!(CountTable::new(0), Err(ModelError::InvalidOrder { order: 0 })));
	}

	#[test]
	fn single_word_headline() {
		let mut table = CountTable::new(2).unwrap();
		table.add_headline("Florida");

		let start = History::initial(2);
		let after = start.advance(word("florida"));
		assert_eq!(table.state(&start).unwrap().count(&word("florida")), 1);
		assert_eq!(table.state(&after).unwrap().count(&Token::End), 1);
		assert_eq!(table.len(), 2);
		assert_eq!(table.headlines(), 1);
	}

	#[test]
	fn blank_headline_counts_end_at_start() {
		let mut table = CountTable::new(1).unwrap();
		table.add_headline("   ");
		assert_eq!(table.state(&History::initial(1)).unwrap().count(&Token::End), 1);
	}

	#[test]
	fn merge_is_commutative() {
		let mut a = CountTable::new(1).unwrap();
		a.add_headline("florida man arrested");
		let mut b = CountTable::new(1).unwrap();
		b.add_headline("florida man escapes");

		let mut ab = a.clone();
		ab.merge(&b).unwrap();
		let mut ba = b.clone();
		ba.merge(&a).unwrap();

		assert_eq!(ab, ba);
		assert_eq!(ab.headlines(), 2);
	}

	#[test]
	fn merge_rejects_other_order() {
		let mut a = CountTable::new(1).unwrap();
		let b = CountTable::new(2).unwrap();
		assert!(matches!(
			a.merge(&b),
			Err(ModelError::OrderMismatch { expected: 1, found: 2 })
		));
	}

	#[test]
	fn normalize_empty_table_fails() {
		let table = CountTable::new(2).unwrap();
		assert!(matches!(table.normalize(), Err(ModelError::EmptyCorpus)));
	}
}
