use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Default model order.
pub const DEFAULT_ORDER: usize = 2;

/// Default number of chunks per CPU for threaded training.
pub const DEFAULT_CHUNK_FACTOR: usize = 8;

/// Default cap on generated words before a walk is abandoned.
pub const DEFAULT_MAX_STEPS: usize = 500;

/// Default number of retries when a candidate is rejected.
pub const DEFAULT_NB_TRY: usize = 100;

/// Default number of consecutive failures before a batch gives up.
pub const DEFAULT_CONSECUTIVE_INVALID_LIMIT: usize = 2000;

/// Parameters of a training run.
///
/// # Invariants
/// - `order` >= 1
/// - `chunk_factor` >= 1
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainingConfig {
	order: usize,
	chunk_factor: usize,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		Self { order: DEFAULT_ORDER, chunk_factor: DEFAULT_CHUNK_FACTOR }
	}
}

impl TrainingConfig {
	/// Creates a configuration for an order-`order` model.
	///
	/// # Errors
	/// Returns [`ModelError::InvalidOrder`] if `order` is zero.
	pub fn new(order: usize) -> Result<Self> {
		let mut config = Self::default();
		config.set_order(order)?;
		Ok(config)
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn chunk_factor(&self) -> usize {
		self.chunk_factor
	}

	/// Sets the model order (number of context tokens).
	pub fn set_order(&mut self, order: usize) -> Result<()> {
		if order == 0 {
			return Err(ModelError::InvalidOrder { order });
		}
		self.order = order;
		Ok(())
	}

	/// Sets how many chunks per CPU threaded training splits the corpus into.
	pub fn set_chunk_factor(&mut self, chunk_factor: usize) -> Result<()> {
		if chunk_factor == 0 {
			return Err(ModelError::InvalidConfig("chunk factor must be >= 1".to_owned()));
		}
		self.chunk_factor = chunk_factor;
		Ok(())
	}
}

/// Parameters of generation.
///
/// - `max_steps`: words produced before a walk is reported as capped
/// - `nb_try`: extra attempts allowed to find one valid candidate
/// - `consecutive_invalid_limit`: failures in a row after which a batch stops
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
	max_steps: usize,
	pub nb_try: usize,
	pub consecutive_invalid_limit: usize,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			max_steps: DEFAULT_MAX_STEPS,
			nb_try: DEFAULT_NB_TRY,
			consecutive_invalid_limit: DEFAULT_CONSECUTIVE_INVALID_LIMIT,
		}
	}
}

impl GenerationConfig {
	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Sets the step cap.
	///
	/// # Errors
	/// Returns an error if `max_steps` is zero.
	pub fn set_max_steps(&mut self, max_steps: usize) -> Result<()> {
		if max_steps == 0 {
			return Err(ModelError::InvalidConfig("max_steps must be >= 1".to_owned()));
		}
		self.max_steps = max_steps;
		Ok(())
	}
}
