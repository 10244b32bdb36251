//! Centralized tuning constants for the prediction engine.
//!
//! The weighted tables live in [`crate::tables`]; the values here govern the
//! engine lifecycle and persistence so they can only change through reviewed
//! code rather than through runtime configuration.

// Engine timing -------------------------------------------------------------
/// Simulated calculation time between a request and its result.
pub const DEFAULT_DELAY_MS: u64 = 2_000;

// Step-count draws -----------------------------------------------------------
/// Every step rule partitions `[0, STEP_ROLL_TOTAL)`.
pub const STEP_ROLL_TOTAL: u8 = 100;

// History persistence --------------------------------------------------------
/// Maximum number of entries retained by the history log.
pub const HISTORY_CAPACITY: usize = 10;
/// Name of the persisted record holding the serialized history.
pub const DEFAULT_HISTORY_KEY: &str = "predictionHistory";

// RNG stream domains ---------------------------------------------------------
pub(crate) const RNG_DOMAIN_STEPS: &[u8] = b"steps";
pub(crate) const RNG_DOMAIN_MULTIPLIER: &[u8] = b"multiplier";

// Logging targets ------------------------------------------------------------
pub(crate) const LOG_TARGET_ENGINE: &str = "chickenroad::engine";
pub(crate) const LOG_TARGET_HISTORY: &str = "chickenroad::history";
