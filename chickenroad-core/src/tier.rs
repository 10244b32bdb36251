//! Difficulty tiers selecting a multiplier table and a step rule.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty level chosen by the caller before a prediction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    #[default]
    Medium,
    Hard,
    /// Persisted as `hardcore`; history written by older builds used `extreme`.
    #[serde(alias = "extreme")]
    Hardcore,
}

/// Raised when a caller names a tier outside the four supported levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierError {
    #[error("unsupported difficulty tier: {0:?}")]
    Unsupported(String),
}

impl DifficultyTier {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Hardcore];

    /// Stable lowercase name used in persisted history.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Hardcore => "hardcore",
        }
    }

    /// Display name for selectors and headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Hardcore => "Hardcore",
        }
    }

    /// Short summary of the advertised multiplier bands for this tier.
    #[must_use]
    pub const fn profit_tip(self) -> &'static str {
        match self {
            Self::Easy => {
                "Tip: Easy mode offers frequent smaller wins with minimal risk. 70% chance of \
                 1.01x-1.56x, 25% chance of 1.56x-2.12x, 4% chance of 2.28x-3.28x, and only 1% \
                 chance of reaching 3.70x."
            }
            Self::Medium => {
                "Tip: Medium mode has balanced risk-reward. 65% chance of 1.08x-2.05x, 30% chance \
                 of 2.37x-5.61x, and only 5% chance of reaching 6.91x-14.29x."
            }
            Self::Hard => {
                "Tip: Hard mode offers higher potential with moderate risk. 60% chance of \
                 1.18x-1.83x, 35% chance of 2.31x-5.02x, and only 5% chance of reaching \
                 6.66x-17.74x."
            }
            Self::Hardcore => {
                "Tip: Hardcore mode has the highest potential returns with controlled risk. 70% \
                 chance of 1.44x-3.45x, 25% chance of 5.53x-9.09x, and only 5% chance of reaching \
                 15.30x-48.70x."
            }
        }
    }
}

/// Tip shown before any tier has been picked.
pub const GENERIC_PROFIT_TIP: &str = "Tip: Select a difficulty level that matches your risk \
     tolerance. All modes have been optimized to minimize losses while maintaining exciting \
     potential returns.";

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "hardcore" | "extreme" => Ok(Self::Hardcore),
            _ => Err(TierError::Unsupported(s.to_string())),
        }
    }
}

impl TryFrom<&str> for DifficultyTier {
    type Error = TierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
