use std::collections::HashSet;

use log::{debug, warn};
use rand::Rng;

use super::config::GenerationConfig;
use super::ngram_model::NGramModel;
use super::token::Token;
use super::validator::Validator;

/// Why a generation walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
	/// The end symbol was drawn.
	End,
	/// The current history was never seen during training.
	UnseenHistory,
	/// The step cap was reached before the end symbol.
	Capped,
}

/// Result of one generation walk: the words produced and why it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
	words: Vec<String>,
	termination: Termination,
}

impl Generation {
	pub fn words(&self) -> &[String] {
		&self.words
	}

	pub fn termination(&self) -> Termination {
		self.termination
	}

	/// Words joined with single spaces.
	pub fn text(&self) -> String {
		self.words.join(" ")
	}

	/// `false` for capped walks, which callers should discard.
	pub fn is_usable(&self) -> bool {
		self.termination != Termination::Capped
	}
}

/// Outcome of [`Generator::generate_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
	/// Distinct accepted headlines, in generation order.
	pub headlines: Vec<String>,
	/// Total number of walks performed.
	pub attempts: usize,
	/// Set when the batch stopped on the consecutive failure limit.
	pub exhausted: bool,
}

/// Samples new headlines from a trained model.
///
/// The generator holds configuration only. Randomness comes from the
/// `rng` argument of each call, so one model and one generator can serve
/// concurrent callers, each with its own (possibly seeded) source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generator {
	config: GenerationConfig,
}

impl Generator {
	pub fn new(config: GenerationConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	/// Performs one random walk from the padded start history.
	///
	/// # Behavior
	/// - An unseen history stops the walk silently ([`Termination::UnseenHistory`]).
	/// - Drawing the end symbol stops the walk ([`Termination::End`]).
	/// - After `max_steps` words the walk is abandoned ([`Termination::Capped`]).
	///
	/// The returned words never contain padding or end symbols.
	pub fn generate<R: Rng + ?Sized>(&self, model: &NGramModel, rng: &mut R) -> Generation {
		let mut history = model.initial();
		let mut words = Vec::new();

		loop {
			let Some(distribution) = model.get(&history) else {
				return Generation { words, termination: Termination::UnseenHistory };
			};

			let next = match distribution.sample(rng) {
				Some(Token::Word(w)) => w.clone(),
				Some(Token::End) => {
					return Generation { words, termination: Termination::End };
				}
				// Padding is never recorded as a next token.
				Some(Token::Pad) | None => {
					return Generation { words, termination: Termination::UnseenHistory };
				}
			};

			if words.len() >= self.config.max_steps() {
				return Generation { words, termination: Termination::Capped };
			}

			history = history.advance(Token::Word(next.clone()));
			words.push(next);
		}
	}

	/// Generates until a usable candidate passes `validator`.
	///
	/// Makes at most `nb_try + 1` walks; returns `None` if none was accepted.
	pub fn generate_valid<R, V>(&self, model: &NGramModel, validator: &V, rng: &mut R) -> Option<String>
	where
		R: Rng + ?Sized,
		V: Validator + ?Sized,
	{
		for _ in 0..=self.config.nb_try {
			let generation = self.generate(model, rng);
			if !generation.is_usable() {
				continue;
			}
			let text = generation.text();
			if validator.is_valid(&text) {
				return Some(text);
			}
		}
		None
	}

	/// Collects up to `count` distinct headlines accepted by `validator`.
	///
	/// Capped walks, rejected candidates and repeats count as failures; after
	/// `consecutive_invalid_limit` failures in a row the batch stops with
	/// `exhausted` set.
	pub fn generate_batch<R, V>(&self, model: &NGramModel, count: usize, validator: &V, rng: &mut R) -> Batch
	where
		R: Rng + ?Sized,
		V: Validator + ?Sized,
	{
		let mut batch = Batch::default();
		let mut seen = HashSet::new();
		let mut consecutive_invalid = 0;

		while batch.headlines.len() < count {
			let generation = self.generate(model, rng);
			batch.attempts += 1;

			let text = generation.text();
			if generation.is_usable() && validator.is_valid(&text) && seen.insert(text.clone()) {
				batch.headlines.push(text);
				consecutive_invalid = 0;
			} else if consecutive_invalid >= self.config.consecutive_invalid_limit {
				warn!(
					"failed to construct a headline after {consecutive_invalid} attempts, try a smaller order or more training data"
				);
				batch.exhausted = true;
				break;
			} else {
				consecutive_invalid += 1;
			}
		}

		debug!("generated {}/{count} headlines in {} attempts", batch.headlines.len(), batch.attempts);
		batch
	}
}
