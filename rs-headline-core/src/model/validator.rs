use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use super::corpus::Corpus;
use super::token::{join_words, tokenize};

/// Acceptance policy for generated candidates.
///
/// The generator only produces candidates; whether one is usable is decided
/// by the caller through this trait. Any `Fn(&str) -> bool` is a validator.
pub trait Validator {
	fn is_valid(&self, candidate: &str) -> bool;
}

impl<F> Validator for F
where
	F: Fn(&str) -> bool,
{
	fn is_valid(&self, candidate: &str) -> bool {
		self(candidate)
	}
}

/// Accepts every non-empty candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
	fn is_valid(&self, candidate: &str) -> bool {
		!candidate.is_empty()
	}
}

pub const DEFAULT_MIN_WORDS: usize = 5;
pub const DEFAULT_MAX_WORDS: usize = 20;
pub const DEFAULT_REQUIRED_PHRASE: &str = "florida man";

/// Word-count, phrase and novelty rules for generated headlines.
///
/// A candidate is valid when:
/// - its word count is within `min_words..=max_words`
/// - it contains `required_phrase` (if any)
/// - it is not one of the excluded headlines (typically the training corpus)
///
/// Comparisons are made on lowercase, single-spaced text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HeadlinePolicy {
	min_words: usize,
	max_words: usize,
	required_phrase: Option<String>,
	#[serde(skip)]
	excluded: HashSet<String>,
}

impl Default for HeadlinePolicy {
	fn default() -> Self {
		Self {
			min_words: DEFAULT_MIN_WORDS,
			max_words: DEFAULT_MAX_WORDS,
			required_phrase: Some(DEFAULT_REQUIRED_PHRASE.to_owned()),
			excluded: HashSet::new(),
		}
	}
}

fn normalize(text: &str) -> String {
	join_words(&tokenize(text))
}

impl HeadlinePolicy {
	/// A policy without any rule besides the word bounds `1..=usize::MAX`.
	pub fn permissive() -> Self {
		Self {
			min_words: 1,
			max_words: usize::MAX,
			required_phrase: None,
			excluded: HashSet::new(),
		}
	}

	/// Sets inclusive word-count bounds.
	///
	/// # Errors
	/// Returns an error if `min_words > max_words`.
	pub fn set_word_bounds(&mut self, min_words: usize, max_words: usize) -> Result<()> {
		if min_words > max_words {
			return Err(ModelError::InvalidConfig(format!(
				"min_words ({min_words}) must not exceed max_words ({max_words})"
			)));
		}
		self.min_words = min_words;
		self.max_words = max_words;
		Ok(())
	}

	/// Requires candidates to contain `phrase`; `None` removes the rule.
	pub fn set_required_phrase(&mut self, phrase: Option<&str>) {
		self.required_phrase = phrase.map(normalize).filter(|p| !p.is_empty());
	}

	/// Rejects every headline of `corpus`.
	pub fn exclude_corpus(&mut self, corpus: &Corpus) {
		self.excluded.extend(corpus.iter().map(normalize));
	}

	pub fn min_words(&self) -> usize {
		self.min_words
	}

	pub fn max_words(&self) -> usize {
		self.max_words
	}

	pub fn required_phrase(&self) -> Option<&str> {
		self.required_phrase.as_deref()
	}
}

impl Validator for HeadlinePolicy {
	fn is_valid(&self, candidate: &str) -> bool {
		let text = normalize(candidate);
		let words = text.split(' ').filter(|w| !w.is_empty()).count();

		(self.min_words..=self.max_words).contains(&words)
			&& self.required_phrase.as_deref().is_none_or(|p| text.contains(p))
			&& !self.excluded.contains(&text)
	}
}
