//! Prediction values and their persisted history shape.
use serde::{Deserialize, Serialize};
use std::num::NonZeroU8;

use crate::rng::PredictionRng;
use crate::tables::{step_rule_for, table_for};
use crate::tier::DifficultyTier;

/// Outcome of one completed engine request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub tier: DifficultyTier,
    pub step_count: NonZeroU8,
    pub multiplier: f64,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl Prediction {
    /// The persisted projection of this prediction.
    ///
    /// `step_count` is not part of the persisted record; a log reloaded from
    /// storage only knows the tier, multiplier and time of each prediction.
    #[must_use]
    pub const fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            difficulty: self.tier,
            multiplier: self.multiplier,
            timestamp: self.timestamp,
        }
    }
}

/// One persisted history record: `{difficulty, multiplier, timestamp}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub difficulty: DifficultyTier,
    pub multiplier: f64,
    pub timestamp: i64,
}

impl From<&Prediction> for HistoryEntry {
    fn from(prediction: &Prediction) -> Self {
        prediction.to_history_entry()
    }
}

/// Sample a step count and an independent multiplier for `tier`.
#[must_use]
pub fn draw_prediction(tier: DifficultyTier, rng: &mut PredictionRng, timestamp: i64) -> Prediction {
    let step_count = step_rule_for(tier).sample(rng.steps());
    let multiplier = table_for(tier).sample(rng.multiplier());
    Prediction {
        tier,
        step_count,
        multiplier,
        timestamp,
    }
}
