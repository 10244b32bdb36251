//! Timed driver running the engine's calculation delay on tokio.
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use crate::config::PredictorConfig;
use crate::constants::LOG_TARGET_ENGINE;
use crate::engine::{Completed, EngineError, EngineState, PredictionEngine, Ticket};
use crate::history::HistoryLog;
use crate::storage::KeyValueStorage;
use crate::tier::DifficultyTier;

type SharedEngine<S> = Arc<Mutex<PredictionEngine<S>>>;

fn lock<S: KeyValueStorage>(engine: &SharedEngine<S>) -> MutexGuard<'_, PredictionEngine<S>> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Handle for one in-flight request.
#[derive(Debug)]
pub struct PendingPrediction {
    ticket: Ticket,
    result: oneshot::Receiver<Result<Completed, EngineError>>,
}

impl PendingPrediction {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Wait for the delay to elapse and the result to be recorded.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Cancelled`] when the request was cancelled or
    /// the predictor was dropped first.
    pub async fn wait(self) -> Result<Completed, EngineError> {
        self.result.await.map_err(|_| EngineError::Cancelled)?
    }
}

/// Owns a [`PredictionEngine`] behind a single mutex and drives its delay.
///
/// Dropping the predictor cancels any pending timer so it never fires into a
/// torn-down owner.
#[derive(Debug)]
pub struct Predictor<S: KeyValueStorage + Send + 'static> {
    engine: SharedEngine<S>,
    delay: Duration,
    pending: Mutex<Option<(Ticket, AbortHandle)>>,
}

impl<S: KeyValueStorage + Send + 'static> Predictor<S> {
    /// Load history from `storage` and build an idle predictor.
    pub fn new(storage: S, config: &PredictorConfig) -> Self {
        let engine = crate::create_engine(storage, config);
        debug!(target: LOG_TARGET_ENGINE, "predictor seeded with {}", engine.rng().seed());
        Self::from_engine(engine, config.delay())
    }

    pub fn from_engine(engine: PredictionEngine<S>, delay: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Enter `Calculating` now and schedule completion after the delay.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Busy`] while a request is pending.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn request(&self, tier: DifficultyTier) -> Result<PendingPrediction, EngineError> {
        // Held until the abort handle is stored so `cancel` never misses it.
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let ticket = lock(&self.engine).request(tier)?;
        let (tx, rx) = oneshot::channel();
        let engine = Arc::clone(&self.engine);
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = lock(&engine).complete(ticket, now_millis());
            let _ = tx.send(outcome);
        });
        *pending = Some((ticket, task.abort_handle()));
        Ok(PendingPrediction { ticket, result: rx })
    }

    /// Parse a tier name, then [`Self::request`] it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Tier`] for unknown names and
    /// [`EngineError::Busy`] while a request is pending.
    pub fn request_named(&self, tier: &str) -> Result<PendingPrediction, EngineError> {
        self.request(tier.parse::<DifficultyTier>()?)
    }

    /// Abort the pending timer, if any, and restore the prior state.
    /// Returns `true` when a calculating request was abandoned.
    ///
    /// The slot keeps the last handle after its timer finishes; taking it
    /// here clears it, and the engine refuses the finished ticket.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let Some((ticket, handle)) = pending.take() else {
            return false;
        };
        handle.abort();
        lock(&self.engine).cancel(ticket)
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        *lock(&self.engine).state()
    }

    #[must_use]
    pub fn history(&self) -> HistoryLog {
        lock(&self.engine).history().clone()
    }

    /// Run `f` against the engine while holding its lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&PredictionEngine<S>) -> R) -> R {
        f(&lock(&self.engine))
    }
}

impl<S: KeyValueStorage + Send + 'static> Drop for Predictor<S> {
    fn drop(&mut self) {
        if self.cancel() {
            debug!(target: LOG_TARGET_ENGINE, "predictor dropped while calculating");
        }
    }
}
