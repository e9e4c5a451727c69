//! A cloneable handle for poking the session from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for observing and aborting the in-flight turn.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) in_flight: Arc<AtomicBool>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Abort the in-flight turn, if any.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Whether a turn is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Mark the turn started and install a fresh cancellation token.
    pub(crate) fn begin_turn(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        self.in_flight.store(true, Ordering::Release);
        token
    }

    /// Clear the in-flight flag. Runs on every turn exit path.
    pub(crate) fn end_turn(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
