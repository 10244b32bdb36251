//! Chicken Road Prediction Engine
//!
//! Platform-agnostic core for the Chicken Road companion tool: per-tier
//! weighted multiplier tables, tiered step-count rules, the
//! `Idle -> Calculating -> Result` state machine, and a bounded history log
//! persisted through a pluggable key-value store.
//! This crate has no UI or platform-specific dependencies.

pub mod config;
pub mod constants;
#[cfg(feature = "async")]
pub mod driver;
pub mod engine;
pub mod history;
pub mod numbers;
pub mod prediction;
pub mod rng;
pub mod storage;
pub mod tables;
pub mod tier;

// Re-export commonly used types
pub use config::{ConfigError, PredictorConfig};
pub use constants::{DEFAULT_DELAY_MS, DEFAULT_HISTORY_KEY, HISTORY_CAPACITY};
#[cfg(feature = "async")]
pub use driver::{PendingPrediction, Predictor};
pub use engine::{Completed, EngineError, EngineState, PredictionEngine, Ticket};
pub use history::{Appended, HistoryError, HistoryLog, HistoryStore};
pub use prediction::{HistoryEntry, Prediction, draw_prediction};
pub use rng::{CountingRng, PredictionRng};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use tables::{
    MultiplierTable, ProbabilityBand, StepOutcome, StepRange, StepRule, StepRuleError,
    WeightedMultiplier, bands_for, step_rule_for, table_for,
};
pub use tier::{DifficultyTier, GENERIC_PROFIT_TIP, TierError};

/// Build a synchronous engine over `storage` using `config`'s key and seed.
///
/// Callers that schedule their own delay use this instead of
/// [`driver::Predictor`].
pub fn create_engine<S: KeyValueStorage>(storage: S, config: &PredictorConfig) -> PredictionEngine<S> {
    let history = HistoryStore::open_with_key(storage, config.storage_key.clone());
    let rng = config
        .seed
        .map_or_else(PredictionRng::from_entropy, PredictionRng::from_user_seed);
    PredictionEngine::new(history, rng)
}
