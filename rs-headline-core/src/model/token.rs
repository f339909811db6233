use std::fmt;

use serde::{Deserialize, Serialize};

/// Rendering of [`Token::Pad`] in diagnostics.
pub const PAD_SYMBOL: &str = "~";

/// Rendering of [`Token::End`] in diagnostics.
pub const END_SYMBOL: &str = "";

/// A case-folded word, or one of the two reserved symbols.
///
/// Ordering is `Pad < Word(_) < End`, words being compared lexicographically.
/// Distributions rely on it to break count ties deterministically.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
	/// Fills the history before enough real words were seen.
	Pad,
	Word(String),
	/// Marks the end of a trained headline.
	End,
}

impl Token {
	/// Returns the word, or `None` for reserved symbols.
	pub fn as_word(&self) -> Option<&str> {
		match self {
			Token::Word(w) => Some(w),
			_ => None,
		}
	}

	pub fn is_end(&self) -> bool {
		matches!(self, Token::End)
	}

	pub fn as_str(&self) -> &str {
		match self {
			Token::Pad => PAD_SYMBOL,
			Token::Word(w) => w,
			Token::End => END_SYMBOL,
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Lowercases and trims a raw headline.
pub fn clean_headline(headline: &str) -> String {
	headline.trim().to_lowercase()
}

/// Splits a headline into lowercase word tokens.
///
/// Splits on whitespace runs only; punctuation stays attached to words.
pub fn tokenize(headline: &str) -> Vec<Token> {
	headline
		.to_lowercase()
		.split_whitespace()
		.map(|w| Token::Word(w.to_owned()))
		.collect()
}

/// Joins word tokens with single spaces, skipping reserved symbols.
pub fn join_words<'a, I>(tokens: I) -> String
where
	I: IntoIterator<Item = &'a Token>,
{
	tokens
		.into_iter()
		.filter_map(Token::as_word)
		.collect::<Vec<_>>()
		.join(" ")
}
