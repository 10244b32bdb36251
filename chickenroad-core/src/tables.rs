//! Weighted multiplier tables and tiered step-count rules.
//!
//! Each tier owns one immutable multiplier table and one step rule. Tables
//! store `(value, weight)` pairs whose weights sum to the length of the
//! duplicated lists they were authored from, so a weight of `n` in a table of
//! total `t` is an exact `n / t` probability.
use rand::Rng;
use serde::Serialize;
use std::num::NonZeroU8;

use crate::constants::STEP_ROLL_TOTAL;
use crate::tier::DifficultyTier;

/// One multiplier and its relative weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedMultiplier {
    pub value: f64,
    pub weight: u16,
}

const fn wm(value: f64, weight: u16) -> WeightedMultiplier {
    WeightedMultiplier { value, weight }
}

/// Immutable weighted table of payout multipliers for one tier.
#[derive(Debug, PartialEq, Serialize)]
pub struct MultiplierTable {
    entries: &'static [WeightedMultiplier],
}

impl MultiplierTable {
    #[must_use]
    pub const fn entries(&self) -> &'static [WeightedMultiplier] {
        self.entries
    }

    /// Sum of all weights; the denominator of every probability in the table.
    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|entry| u32::from(entry.weight)).sum()
    }

    /// Whether `value` can ever be drawn from this table.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.weight > 0 && (entry.value - value).abs() < f64::EPSILON)
    }

    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.entries
            .iter()
            .map(|entry| entry.value)
            .fold(f64::INFINITY, f64::min)
    }

    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.entries
            .iter()
            .map(|entry| entry.value)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Exact probability that a draw lands in `[low, high]`.
    #[must_use]
    pub fn share_in(&self, low: f64, high: f64) -> f64 {
        let total = self.total_weight();
        if total == 0 {
            return 0.0;
        }
        let hits: u32 = self
            .entries
            .iter()
            .filter(|entry| entry.value >= low && entry.value <= high)
            .map(|entry| u32::from(entry.weight))
            .sum();
        f64::from(hits) / f64::from(total)
    }

    /// Draw one multiplier with probability proportional to its weight.
    ///
    /// # Panics
    ///
    /// Panics if the table has zero total weight. Every built-in table is
    /// non-empty.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let mut roll = rng.gen_range(0..self.total_weight());
        for entry in self.entries {
            let weight = u32::from(entry.weight);
            if roll < weight {
                return entry.value;
            }
            roll -= weight;
        }
        unreachable!("roll is below the total weight")
    }
}

static EASY_TABLE: MultiplierTable = MultiplierTable {
    entries: &[
        // 70%
        wm(1.01, 10),
        wm(1.03, 10),
        wm(1.06, 10),
        wm(1.10, 10),
        wm(1.15, 10),
        wm(1.19, 10),
        wm(1.24, 5),
        wm(1.30, 5),
        // 25%
        wm(1.35, 5),
        wm(1.42, 5),
        wm(1.48, 5),
        wm(1.56, 5),
        wm(1.65, 2),
        wm(1.75, 1),
        wm(1.85, 1),
        wm(1.98, 1),
        // 4%
        wm(2.12, 1),
        wm(2.28, 1),
        wm(2.47, 1),
        wm(2.70, 1),
        // 1%
        wm(3.70, 1),
    ],
};

// Authored as 101 entries; the low band carries one extra 1.78.
static MEDIUM_TABLE: MultiplierTable = MultiplierTable {
    entries: &[
        wm(1.08, 13),
        wm(1.21, 13),
        wm(1.37, 13),
        wm(1.56, 13),
        wm(1.78, 9),
        wm(2.05, 5),
        wm(2.37, 10),
        wm(2.77, 10),
        wm(3.24, 5),
        wm(3.85, 2),
        wm(4.62, 2),
        wm(5.61, 1),
        wm(6.91, 2),
        wm(8.64, 1),
        wm(10.99, 1),
        wm(14.29, 1),
    ],
};

static HARD_TABLE: MultiplierTable = MultiplierTable {
    entries: &[
        wm(1.18, 30),
        wm(1.46, 20),
        wm(1.83, 10),
        wm(2.31, 12),
        wm(2.95, 11),
        wm(3.82, 6),
        wm(5.02, 6),
        wm(6.66, 1),
        wm(9.04, 1),
        wm(12.52, 1),
        wm(17.74, 2),
    ],
};

static HARDCORE_TABLE: MultiplierTable = MultiplierTable {
    entries: &[
        wm(1.44, 30),
        wm(2.21, 20),
        wm(3.45, 20),
        wm(5.53, 15),
        wm(9.09, 10),
        wm(15.30, 2),
        wm(26.78, 2),
        wm(48.70, 1),
    ],
};

/// Multiplier table for `tier`.
#[must_use]
pub fn table_for(tier: DifficultyTier) -> &'static MultiplierTable {
    match tier {
        DifficultyTier::Easy => &EASY_TABLE,
        DifficultyTier::Medium => &MEDIUM_TABLE,
        DifficultyTier::Hard => &HARD_TABLE,
        DifficultyTier::Hardcore => &HARDCORE_TABLE,
    }
}

/// Advertised probability of a multiplier falling in `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityBand {
    pub low: f64,
    pub high: f64,
    pub share: f64,
}

const fn band(low: f64, high: f64, share: f64) -> ProbabilityBand {
    ProbabilityBand { low, high, share }
}

const EASY_BANDS: [ProbabilityBand; 4] = [
    band(1.01, 1.30, 0.70),
    band(1.35, 1.98, 0.25),
    band(2.12, 2.70, 0.04),
    band(3.70, 3.70, 0.01),
];
const MEDIUM_BANDS: [ProbabilityBand; 3] = [
    band(1.08, 2.05, 0.65),
    band(2.37, 5.61, 0.30),
    band(6.91, 14.29, 0.05),
];
const HARD_BANDS: [ProbabilityBand; 3] = [
    band(1.18, 1.83, 0.60),
    band(2.31, 5.02, 0.35),
    band(6.66, 17.74, 0.05),
];
const HARDCORE_BANDS: [ProbabilityBand; 3] = [
    band(1.44, 3.45, 0.70),
    band(5.53, 9.09, 0.25),
    band(15.30, 48.70, 0.05),
];

/// Documented multiplier bands for `tier`, lowest first.
#[must_use]
pub const fn bands_for(tier: DifficultyTier) -> &'static [ProbabilityBand] {
    match tier {
        DifficultyTier::Easy => &EASY_BANDS,
        DifficultyTier::Medium => &MEDIUM_BANDS,
        DifficultyTier::Hard => &HARD_BANDS,
        DifficultyTier::Hardcore => &HARDCORE_BANDS,
    }
}

/// What a step sub-range resolves to once the roll lands in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    Fixed(u8),
    /// Uniform over `base..base + width`.
    Span { base: u8, width: u8 },
}

impl StepOutcome {
    fn resolve<R: Rng>(self, rng: &mut R) -> u8 {
        match self {
            Self::Fixed(value) => value,
            Self::Span { base, width } => base + rng.gen_range(0..width),
        }
    }

    /// Smallest and largest step counts this outcome can produce.
    #[must_use]
    pub const fn bounds(self) -> (u8, u8) {
        match self {
            Self::Fixed(value) => (value, value),
            Self::Span { base, width } => (base, base + width - 1),
        }
    }

    fn probability_of(self, steps: u8) -> f64 {
        match self {
            Self::Fixed(value) => {
                if value == steps {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Span { base, width } => {
                if steps >= base && steps < base + width {
                    1.0 / f64::from(width)
                } else {
                    0.0
                }
            }
        }
    }
}

/// One consecutive slice of the `[0, 100)` roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepRange {
    pub width: u8,
    pub outcome: StepOutcome,
}

const fn fixed(width: u8, value: u8) -> StepRange {
    StepRange {
        width,
        outcome: StepOutcome::Fixed(value),
    }
}

const fn span(width: u8, base: u8) -> StepRange {
    StepRange {
        width,
        outcome: StepOutcome::Span { base, width: 2 },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepRuleError {
    #[error("step rule widths sum to {0}, expected {STEP_ROLL_TOTAL}")]
    WidthTotal(u32),
    #[error("step range {0} yields a zero or empty step count")]
    EmptyOutcome(usize),
}

/// Partition of the `[0, 100)` roll into step-count outcomes.
#[derive(Debug, PartialEq, Serialize)]
pub struct StepRule {
    ranges: &'static [StepRange],
}

impl StepRule {
    #[must_use]
    pub const fn ranges(&self) -> &'static [StepRange] {
        self.ranges
    }

    /// # Errors
    ///
    /// Returns an error when the widths do not cover exactly `[0, 100)` or a
    /// range can yield a step count of zero.
    pub fn validate(&self) -> Result<(), StepRuleError> {
        let total: u32 = self.ranges.iter().map(|range| u32::from(range.width)).sum();
        if total != u32::from(STEP_ROLL_TOTAL) {
            return Err(StepRuleError::WidthTotal(total));
        }
        for (idx, range) in self.ranges.iter().enumerate() {
            let valid = match range.outcome {
                StepOutcome::Fixed(value) => value > 0,
                StepOutcome::Span { base, width } => base > 0 && width > 0,
            };
            if !valid {
                return Err(StepRuleError::EmptyOutcome(idx));
            }
        }
        Ok(())
    }

    /// Map a roll in `[0, 100)` to its sub-range.
    #[must_use]
    pub fn range_for_roll(&self, roll: u8) -> Option<&StepRange> {
        let mut upper = 0u8;
        self.ranges.iter().find(|range| {
            upper = upper.saturating_add(range.width);
            roll < upper
        })
    }

    /// Draw `r` uniformly from `[0, 100)` and resolve it to a step count.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> NonZeroU8 {
        let roll = rng.gen_range(0..STEP_ROLL_TOTAL);
        let steps = self
            .range_for_roll(roll)
            .map_or(1, |range| range.outcome.resolve(rng));
        NonZeroU8::new(steps).unwrap_or(NonZeroU8::MIN)
    }

    /// Exact probability of producing `steps`.
    #[must_use]
    pub fn probability_of(&self, steps: u8) -> f64 {
        self.ranges
            .iter()
            .map(|range| {
                f64::from(range.width) / f64::from(STEP_ROLL_TOTAL)
                    * range.outcome.probability_of(steps)
            })
            .sum()
    }

    /// Largest step count the rule can yield.
    #[must_use]
    pub fn max_steps(&self) -> u8 {
        self.ranges
            .iter()
            .map(|range| range.outcome.bounds().1)
            .max()
            .unwrap_or(1)
    }
}

static EASY_STEPS: StepRule = StepRule {
    ranges: &[span(60, 1), span(30, 3), span(10, 5)],
};
static MEDIUM_STEPS: StepRule = StepRule {
    ranges: &[span(70, 1), span(25, 3), fixed(5, 5)],
};
static HARD_STEPS: StepRule = StepRule {
    ranges: &[fixed(80, 1), fixed(15, 2), fixed(5, 3)],
};
static HARDCORE_STEPS: StepRule = StepRule {
    ranges: &[fixed(40, 1), fixed(50, 2), fixed(10, 3)],
};

/// Step-count rule for `tier`.
#[must_use]
pub fn step_rule_for(tier: DifficultyTier) -> &'static StepRule {
    match tier {
        DifficultyTier::Easy => &EASY_STEPS,
        DifficultyTier::Medium => &MEDIUM_STEPS,
        DifficultyTier::Hard => &HARD_STEPS,
        DifficultyTier::Hardcore => &HARDCORE_STEPS,
    }
}
