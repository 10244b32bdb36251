//! Prediction state machine: `Idle -> Calculating -> Result`.
//!
//! The engine itself is synchronous. [`PredictionEngine::request`] enters the
//! calculating state and hands back a [`Ticket`]; whoever owns the timer calls
//! [`PredictionEngine::complete`] with that ticket once the delay elapses.
//! Completion samples the prediction, moves to `Result`, and appends to the
//! history inside one `&mut self` call, so the two can never interleave with
//! another request.
use log::debug;
use std::fmt;

use crate::constants::LOG_TARGET_ENGINE;
use crate::history::{HistoryError, HistoryLog, HistoryStore};
use crate::prediction::{Prediction, draw_prediction};
use crate::rng::PredictionRng;
use crate::storage::KeyValueStorage;
use crate::tier::{DifficultyTier, TierError};

/// Identifies one accepted request; stale tickets are refused on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineState {
    Idle,
    Calculating { ticket: Ticket, tier: DifficultyTier },
    Result(Prediction),
}

impl EngineState {
    #[must_use]
    pub const fn is_calculating(&self) -> bool {
        matches!(self, Self::Calculating { .. })
    }

    #[must_use]
    pub const fn prediction(&self) -> Option<&Prediction> {
        match self {
            Self::Result(prediction) => Some(prediction),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("a {0} prediction is already being calculated")]
    Busy(DifficultyTier),
    #[error("ticket {0} does not match the pending request")]
    StaleTicket(Ticket),
    #[error("prediction request was cancelled")]
    Cancelled,
    #[error(transparent)]
    Tier(#[from] TierError),
}

/// A finished request: the prediction plus any persistence warning.
#[derive(Debug)]
pub struct Completed {
    pub prediction: Prediction,
    pub persist_warning: Option<HistoryError>,
}

/// Owns the state tag, the RNG streams, and the history store.
#[derive(Debug)]
pub struct PredictionEngine<S: KeyValueStorage> {
    state: EngineState,
    previous: Option<Prediction>,
    next_ticket: u64,
    rng: PredictionRng,
    history: HistoryStore<S>,
}

impl<S: KeyValueStorage> PredictionEngine<S> {
    /// Create an engine in the `Idle` state over an already-loaded history.
    pub fn new(history: HistoryStore<S>, rng: PredictionRng) -> Self {
        Self {
            state: EngineState::Idle,
            previous: None,
            next_ticket: 0,
            rng,
            history,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryLog {
        self.history.log()
    }

    #[must_use]
    pub const fn history_store(&self) -> &HistoryStore<S> {
        &self.history
    }

    #[must_use]
    pub const fn rng(&self) -> &PredictionRng {
        &self.rng
    }

    /// Enter `Calculating` for `tier`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Busy`] while another request is pending.
    pub fn request(&mut self, tier: DifficultyTier) -> Result<Ticket, EngineError> {
        if let EngineState::Calculating { tier: pending, .. } = self.state {
            debug!(target: LOG_TARGET_ENGINE, "rejecting {tier} request, {pending} pending");
            return Err(EngineError::Busy(pending));
        }
        self.previous = self.state.prediction().copied();
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = Ticket(self.next_ticket);
        self.state = EngineState::Calculating { ticket, tier };
        debug!(target: LOG_TARGET_ENGINE, "calculating {tier} prediction {ticket}");
        Ok(ticket)
    }

    /// Parse a caller-supplied tier name and request it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Tier`] for names outside the four tiers; no
    /// substitute tier is chosen.
    pub fn request_named(&mut self, tier: &str) -> Result<Ticket, EngineError> {
        let tier = tier.parse::<DifficultyTier>()?;
        self.request(tier)
    }

    /// Sample, enter `Result`, then append to history.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StaleTicket`] when `ticket` is not the pending
    /// request (cancelled or superseded); state and history are untouched.
    pub fn complete(&mut self, ticket: Ticket, timestamp: i64) -> Result<Completed, EngineError> {
        let tier = match self.state {
            EngineState::Calculating {
                ticket: pending,
                tier,
            } if pending == ticket => tier,
            _ => return Err(EngineError::StaleTicket(ticket)),
        };
        let prediction = draw_prediction(tier, &mut self.rng, timestamp);
        self.state = EngineState::Result(prediction);
        self.previous = None;
        debug!(
            target: LOG_TARGET_ENGINE,
            "prediction {ticket}: {} steps at {:.2}x",
            prediction.step_count, prediction.multiplier
        );
        let persist_warning = self.history.append(&prediction).warning;
        Ok(Completed {
            prediction,
            persist_warning,
        })
    }

    /// Abandon the pending request and restore the state it replaced.
    /// Returns `false` when `ticket` is not pending.
    pub fn cancel(&mut self, ticket: Ticket) -> bool {
        match self.state {
            EngineState::Calculating { ticket: pending, .. } if pending == ticket => {
                self.state = self
                    .previous
                    .take()
                    .map_or(EngineState::Idle, EngineState::Result);
                debug!(target: LOG_TARGET_ENGINE, "cancelled prediction {ticket}");
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn engine() -> PredictionEngine<MemoryStorage> {
        PredictionEngine::new(
            HistoryStore::open(MemoryStorage::new()),
            PredictionRng::from_user_seed(11),
        )
    }

    #[test]
    fn idle_to_calculating_to_result() {
        let mut engine = engine();
        assert_eq!(*engine.state(), EngineState::Idle);
        let ticket = engine.request(DifficultyTier::Easy).unwrap();
        assert!(engine.state().is_calculating());
        let done = engine.complete(ticket, 100).unwrap();
        assert_eq!(*engine.state(), EngineState::Result(done.prediction));
        assert_eq!(engine.history().len(), 1);
        assert_eq!(
            engine.history().newest().copied(),
            Some(done.prediction.to_history_entry())
        );
    }

    #[test]
    fn second_request_while_calculating_is_busy() {
        let mut engine = engine();
        let ticket = engine.request(DifficultyTier::Hard).unwrap();
        let err = engine.request(DifficultyTier::Easy).unwrap_err();
        assert!(matches!(err, EngineError::Busy(DifficultyTier::Hard)));
        engine.complete(ticket, 1).unwrap();
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn result_can_be_re_predicted() {
        let mut engine = engine();
        let first = engine.request(DifficultyTier::Medium).unwrap();
        engine.complete(first, 1).unwrap();
        let second = engine.request(DifficultyTier::Medium).unwrap();
        assert_ne!(first, second);
        engine.complete(second, 2).unwrap();
        assert_eq!(engine.history().len(), 2);
        assert_eq!(engine.history().newest().unwrap().timestamp, 2);
    }

    #[test]
    fn stale_ticket_does_not_append() {
        let mut engine = engine();
        let ticket = engine.request(DifficultyTier::Easy).unwrap();
        assert!(engine.cancel(ticket));
        assert!(matches!(
            engine.complete(ticket, 1),
            Err(EngineError::StaleTicket(_))
        ));
        assert!(engine.history().is_empty());
        assert_eq!(*engine.state(), EngineState::Idle);
    }

    #[test]
    fn cancel_restores_previous_result() {
        let mut engine = engine();
        let first = engine.request(DifficultyTier::Easy).unwrap();
        let done = engine.complete(first, 1).unwrap();
        let second = engine.request(DifficultyTier::Hard).unwrap();
        assert!(engine.cancel(second));
        assert_eq!(*engine.state(), EngineState::Result(done.prediction));
        assert!(!engine.cancel(second));
    }

    #[test]
    fn unknown_tier_name_is_rejected() {
        let mut engine = engine();
        let err = engine.request_named("extreme-plus").unwrap_err();
        assert!(matches!(err, EngineError::Tier(TierError::Unsupported(_))));
        assert_eq!(*engine.state(), EngineState::Idle);
        assert!(engine.request_named("extreme").is_ok());
    }
}
