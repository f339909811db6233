use rand::Rng;
use serde::{Deserialize, Serialize};

use super::token::Token;

/// One possible next token with its raw count and empirical probability.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Outcome {
	pub token: Token,
	pub count: usize,
	pub probability: f64,
}

/// Normalized next-token distribution for one history.
///
/// # Invariants
/// - Never empty once produced by normalization
/// - Probabilities sum to 1.0 (within floating-point tolerance)
/// - Ordered by descending count, ties by ascending [`Token`] order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Distribution {
	outcomes: Vec<Outcome>,
	total: usize,
}

impl Distribution {
	/// Builds a distribution from `(token, count)` pairs.
	///
	/// Pairs with a zero count are ignored. Duplicate tokens are not merged;
	/// callers pass one pair per token.
	pub fn from_counts<I>(counts: I) -> Self
	where
		I: IntoIterator<Item = (Token, usize)>,
	{
		let mut pairs: Vec<(Token, usize)> = counts.into_iter().filter(|(_, c)| *c > 0).collect();
		pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

		let total: usize = pairs.iter().map(|(_, c)| c).sum();
		let outcomes = pairs
			.into_iter()
			.map(|(token, count)| Outcome {
				token,
				count,
				probability: count as f64 / total as f64,
			})
			.collect();

		Self { outcomes, total }
	}

	pub fn outcomes(&self) -> &[Outcome] {
		&self.outcomes
	}

	/// Iterates over `(token, probability)` pairs in display order.
	pub fn iter(&self) -> impl Iterator<Item = (&Token, f64)> {
		self.outcomes.iter().map(|o| (&o.token, o.probability))
	}

	pub fn len(&self) -> usize {
		self.outcomes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.outcomes.is_empty()
	}

	/// Sum of the raw counts this distribution was built from.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Probability of `token`, `0.0` if it was never observed.
	pub fn probability(&self, token: &Token) -> f64 {
		self.outcomes
			.iter()
			.find(|o| &o.token == token)
			.map_or(0.0, |o| o.probability)
	}

	/// Draws the next token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its count.
	/// Sampling is done on integer counts, so a source that always yields
	/// zero picks the first listed outcome.
	///
	/// Returns `None` if the distribution is empty.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Token> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total);
		for outcome in &self.outcomes {
			if r < outcome.count {
				return Some(&outcome.token);
			}
			r -= outcome.count;
		}

		self.outcomes.last().map(|o| &o.token)
	}
}
