use std::sync::mpsc;
use std::thread;

use log::{debug, info};

use crate::error::{ModelError, Result};
use super::config::TrainingConfig;
use super::corpus::Corpus;
use super::counts::CountTable;
use super::ngram_model::NGramModel;

/// Builds n-gram models from a corpus.
///
/// A `Trainer` is bound to one [`TrainingConfig`]; training with another
/// order means building another trainer. Training never mutates a model:
/// each call returns a fresh [`NGramModel`].
#[derive(Debug, Clone, Copy)]
pub struct Trainer {
	config: TrainingConfig,
}

impl Trainer {
	pub fn new(config: TrainingConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &TrainingConfig {
		&self.config
	}

	/// Counts every headline of `corpus` into a fresh table.
	///
	/// # Errors
	/// Returns [`ModelError::EmptyCorpus`] if the corpus has no headline.
	pub fn count(&self, corpus: &Corpus) -> Result<CountTable> {
		if corpus.is_empty() {
			return Err(ModelError::EmptyCorpus);
		}
		let mut table = CountTable::new(self.config.order())?;
		for headline in corpus.iter() {
			table.add_headline(headline);
		}
		Ok(table)
	}

	/// Trains a model on `corpus` in a single pass.
	pub fn train(&self, corpus: &Corpus) -> Result<NGramModel> {
		let model = self.count(corpus)?.normalize()?;
		info!(
			"trained order-{} model: {} headlines, {} histories",
			self.config.order(),
			corpus.len(),
			model.len()
		);
		Ok(model)
	}

	/// Counts the corpus on several threads and merges the partial tables.
	///
	/// # Behavior
	/// - Splits headlines into chunks (CPU cores * chunk factor).
	/// - Spawns one thread per chunk, each building a partial table.
	/// - Merges partial tables as they arrive.
	///
	/// Counts are integers and merging is commutative, so the result is
	/// identical to [`count`](Trainer::count) whatever the arrival order.
	pub fn count_parallel(&self, corpus: &Corpus) -> Result<CountTable> {
		if corpus.is_empty() {
			return Err(ModelError::EmptyCorpus);
		}
		let order = self.config.order();
		let mut final_table = CountTable::new(order)?;

		let headlines = corpus.headlines();
		let chunks = num_cpus::get() * self.config.chunk_factor();
		let chunk_size = headlines.len().div_ceil(chunks);
		debug!("counting {} headlines in chunks of {chunk_size}", headlines.len());

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in headlines.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					let partial = CountTable::new(order).map(|mut table| {
						for headline in chunk {
							table.add_headline(headline);
						}
						table
					});
					// The receiver outlives the scope, send cannot fail.
					let _ = tx.send(partial);
				});
			}
		});
		drop(tx);

		for partial in rx.iter() {
			final_table.merge(&partial?)?;
		}

		Ok(final_table)
	}

	/// Trains a model using [`count_parallel`](Trainer::count_parallel).
	pub fn train_parallel(&self, corpus: &Corpus) -> Result<NGramModel> {
		let model = self.count_parallel(corpus)?.normalize()?;
		info!(
			"trained order-{} model on {} threads: {} headlines, {} histories",
			self.config.order(),
			num_cpus::get(),
			corpus.len(),
			model.len()
		);
		Ok(model)
	}
}

/// Trains an order-`order` model on `corpus`.
///
/// # Errors
/// - [`ModelError::InvalidOrder`] if `order` is zero (checked first)
/// - [`ModelError::EmptyCorpus`] if the corpus has no headline
pub fn train(corpus: &Corpus, order: usize) -> Result<NGramModel> {
	Trainer::new(TrainingConfig::new(order)?).train(corpus)
}

/// Corpus plus its running counts, for adding headlines one at a time.
///
/// Adding a headline merges its counts into the running table instead of
/// recounting the corpus; the resulting model equals a full retrain.
/// Added headlines are tracked apart from the loaded corpus so that
/// [`clear_added`](TrainingSession::clear_added) can drop them again.
#[derive(Debug, Clone)]
pub struct TrainingSession {
	trainer: Trainer,
	corpus: Corpus,
	counts: CountTable,
	added: Vec<String>,
}

impl TrainingSession {
	/// Counts `corpus` once. An empty corpus is accepted: headlines can be
	/// added later, [`model`](TrainingSession::model) fails until then.
	pub fn new(config: TrainingConfig, corpus: Corpus) -> Result<Self> {
		let trainer = Trainer::new(config);
		let counts = Self::recount(&trainer, &corpus)?;
		Ok(Self { trainer, corpus, counts, added: Vec::new() })
	}

	fn recount(trainer: &Trainer, corpus: &Corpus) -> Result<CountTable> {
		if corpus.is_empty() {
			CountTable::new(trainer.config().order())
		} else {
			trainer.count(corpus)
		}
	}

	/// Adds one headline. Returns `false` (and changes nothing) if it is
	/// blank or already in the corpus.
	pub fn add_headline(&mut self, headline: &str) -> bool {
		if !self.corpus.push(headline) {
			return false;
		}
		if let Some(cleaned) = self.corpus.headlines().last() {
			self.counts.add_headline(cleaned);
			self.added.push(cleaned.clone());
		}
		true
	}

	/// Removes every headline added through
	/// [`add_headline`](TrainingSession::add_headline) and recounts.
	/// Returns how many were removed.
	pub fn clear_added(&mut self) -> Result<usize> {
		let added = std::mem::take(&mut self.added);
		let removed = self.corpus.remove(&added);
		self.counts = Self::recount(&self.trainer, &self.corpus)?;
		info!("removed {removed} added headlines, corpus size {}", self.corpus.len());
		Ok(removed)
	}

	/// Changes the order. The whole corpus is recounted, added headlines
	/// stay tracked.
	pub fn set_order(&mut self, order: usize) -> Result<()> {
		let mut config = *self.trainer.config();
		config.set_order(order)?;
		let trainer = Trainer::new(config);
		self.counts = Self::recount(&trainer, &self.corpus)?;
		self.trainer = trainer;
		Ok(())
	}

	/// Normalizes the current counts into a new model.
	pub fn model(&self) -> Result<NGramModel> {
		self.counts.normalize()
	}

	pub fn corpus(&self) -> &Corpus {
		&self.corpus
	}

	/// Headlines added since the corpus was loaded, cleaned, oldest first.
	pub fn added(&self) -> &[String] {
		&self.added
	}

	pub fn order(&self) -> usize {
		self.counts.order()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::history::History;
	use crate::model::token::Token;

	fn word(w: &str) -> Token {
		Token::Word(w.to_owned())
	}

	#[test]
	fn invalid_order_wins_over_empty_corpus() {
		assert!(matches!(train(&Corpus::new(), 0), Err(ModelError::InvalidOrder { order: 0 })));
		assert!(matches!(train(&Corpus::new(), 2), Err(ModelError::EmptyCorpus)));
	}

	#[test]
	fn parallel_matches_sequential() {
		let corpus = Corpus::from_headlines((0..200).map(|i| format!("florida man {} number {}", i % 7, i)));
		let trainer = Trainer::new(TrainingConfig::new(2).unwrap());

		assert_eq!(trainer.count(&corpus).unwrap(), trainer.count_parallel(&corpus).unwrap());
		assert_eq!(trainer.train(&corpus).unwrap(), trainer.train_parallel(&corpus).unwrap());
	}

	#[test]
	fn parallel_on_tiny_corpus() {
		let corpus = Corpus::from_headlines(["florida"]);
		let trainer = Trainer::new(TrainingConfig::new(1).unwrap());
		let model = trainer.train_parallel(&corpus).unwrap();
		assert_eq!(model.len(), 2);
	}

	#[test]
	fn session_add_equals_retrain() {
		let config = TrainingConfig::new(2).unwrap();
		let mut session = TrainingSession::new(config, Corpus::from_headlines(["florida man arrested"])).unwrap();

		assert!(session.add_headline("Florida man escapes"));
		assert!(!session.add_headline("florida man escapes"));
		assert!(!session.add_headline("  "));

		let full = Corpus::from_headlines(["florida man arrested", "florida man escapes"]);
		assert_eq!(session.model().unwrap(), train(&full, 2).unwrap());
	}

	#[test]
	fn session_starts_empty() {
		let mut session = TrainingSession::new(TrainingConfig::default(), Corpus::new()).unwrap();
		assert!(matches!(session.model(), Err(ModelError::EmptyCorpus)));

		session.add_headline("florida");
		let model = session.model().unwrap();
		let after = History::initial(2).advance(word("florida"));
		assert_eq!(model.get(&after).unwrap().probability(&Token::End), 1.0);
	}

	#[test]
	fn session_order_change_recounts() {
		let mut session = TrainingSession::new(TrainingConfig::default(), Corpus::from_headlines(["a b c"])).unwrap();
		session.set_order(1).unwrap();
		assert_eq!(session.order(), 1);
		assert_eq!(session.model().unwrap(), train(session.corpus(), 1).unwrap());
		assert!(session.set_order(0).is_err());
		assert_eq!(session.order(), 1);
	}

	#[test]
	fn clear_added_restores_loaded_corpus() {
		let loaded = Corpus::from_headlines(["florida man arrested", "florida man escapes"]);
		let mut session = TrainingSession::new(TrainingConfig::default(), loaded.clone()).unwrap();

		assert!(session.add_headline("Florida man eats a sandwich"));
		assert!(session.add_headline("florida man steals a boat"));
		session.set_order(1).unwrap();
		assert_eq!(session.added(), &["florida man eats a sandwich".to_owned(), "florida man steals a boat".to_owned()]);

		assert_eq!(session.clear_added().unwrap(), 2);
		assert!(session.added().is_empty());
		assert_eq!(session.corpus(), &loaded);
		assert_eq!(session.model().unwrap(), train(&loaded, 1).unwrap());
	}

	#[test]
	fn clear_added_on_empty_session() {
		let mut session = TrainingSession::new(TrainingConfig::default(), Corpus::new()).unwrap();
		session.add_headline("florida man wins");
		assert_eq!(session.clear_added().unwrap(), 1);
		assert!(matches!(session.model(), Err(ModelError::EmptyCorpus)));
	}
}
