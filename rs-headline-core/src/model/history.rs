use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use super::token::Token;

/// The last `n` tokens seen, used as the model lookup key.
///
/// A history always holds exactly `order` tokens; positions that precede the
/// first word are filled with [`Token::Pad`]. Histories are values:
/// [`advance`](History::advance) returns a new window.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct History {
	tokens: Vec<Token>,
}

impl History {
	/// Returns `order` copies of [`Token::Pad`].
	pub fn initial(order: usize) -> Self {
		Self { tokens: vec![Token::Pad; order] }
	}

	/// Drops the oldest token and appends `token`.
	///
	/// The length never changes: an order-0 window stays empty.
	pub fn advance(&self, token: Token) -> Self {
		if self.tokens.is_empty() {
			return self.clone();
		}
		let mut tokens = Vec::with_capacity(self.tokens.len());
		tokens.extend(self.tokens.iter().skip(1).cloned());
		tokens.push(token);
		Self { tokens }
	}

	/// Builds a history from explicit tokens (diagnostics and lookups).
	/// The window order is `tokens.len()`.
	///
	/// # Errors
	/// Returns [`ModelError::InvalidOrder`] if `tokens` is empty.
	pub fn from_tokens(tokens: Vec<Token>) -> Result<Self> {
		if tokens.is_empty() {
			return Err(ModelError::InvalidOrder { order: 0 });
		}
		Ok(Self { tokens })
	}

	pub fn order(&self) -> usize {
		self.tokens.len()
	}

	pub fn tokens(&self) -> &[Token] {
		&self.tokens
	}
}

impl fmt::Display for History {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts: Vec<&str> = self.tokens.iter().map(Token::as_str).collect();
		write!(f, "({})", parts.join(", "))
	}
}
